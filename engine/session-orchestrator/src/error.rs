//! Error types for the session orchestrator

use std::path::PathBuf;

use market_calendar::CalendarError;
use symbol_coordinator::CoordError;
use thiserror::Error;

/// Problems with the session configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("No strategies configured")]
    NoStrategies,

    #[error("No scanners configured")]
    NoScanners,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Nothing to run: the process exits cleanly instead of failing
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Missing(_) | Self::NoStrategies | Self::NoScanners)
    }
}

/// Errors that end a run before the topology completes
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Coordination error: {0}")]
    Coordination(#[from] CoordError),

    #[error("Failed to load open positions: {0}")]
    Positions(String),
}

impl SessionError {
    pub fn positions(msg: impl Into<String>) -> Self {
        Self::Positions(msg.into())
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(err) if err.is_skip() => 0,
            _ => 1,
        }
    }
}
