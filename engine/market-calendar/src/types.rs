use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;

/// A single trading day as reported by a calendar source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingDay {
    pub date: NaiveDate,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl TradingDay {
    pub fn new(date: NaiveDate, open: NaiveTime, close: NaiveTime) -> Self {
        Self { date, open, close }
    }
}

/// Today's session bounds in the reference zone
///
/// Both bounds are absent when the market does not trade today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingWindow {
    pub open: Option<DateTime<Tz>>,
    pub close: Option<DateTime<Tz>>,
}

impl TradingWindow {
    pub fn new(open: DateTime<Tz>, close: DateTime<Tz>) -> Self {
        Self { open: Some(open), close: Some(close) }
    }

    /// Window for a day without a session
    pub fn closed() -> Self {
        Self { open: None, close: None }
    }

    pub fn has_session(&self) -> bool {
        self.open.is_some()
    }
}

impl std::fmt::Display for TradingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.open, self.close) {
            (Some(open), Some(close)) => write!(f, "{open} - {close}"),
            (Some(open), None) => write!(f, "{open} - ?"),
            _ => write!(f, "no session"),
        }
    }
}
