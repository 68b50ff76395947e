//! Error types for calendar lookups and window resolution

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Errors raised while resolving the trading window
///
/// All of these are fatal for the run: there is no speculative fallback window.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("Calendar source unreachable: {0}")]
    Unreachable(String),

    #[error("Calendar has no trading day on or after {date}")]
    NoEntry { date: NaiveDate },

    #[error("Session time {local} does not exist in {timezone}")]
    NonexistentLocalTime { local: NaiveDateTime, timezone: String },

    #[error("Invalid session time: {0}")]
    InvalidTime(String),
}

impl CalendarError {
    /// Create a new unreachable error
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }
}
