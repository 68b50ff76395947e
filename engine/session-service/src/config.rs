//! Service configuration management

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use market_calendar::{Tz, DEFAULT_TIMEZONE};
use serde::{Deserialize, Serialize};
use session_orchestrator::{ConfigError, SessionConfig};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Orchestrator options, including scanner and strategy tables
    pub session: SessionConfig,

    /// Trading calendar configuration
    pub calendar: CalendarSettings,

    /// Positions the account already holds
    pub positions: PositionSettings,

    /// Post-session consolidation command
    pub consolidation: ConsolidationSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Regular session hours and market holidays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Reference zone for the session times
    pub timezone: Tz,

    pub open: NaiveTime,

    pub close: NaiveTime,

    /// Weekdays without a session
    pub holidays: Vec<NaiveDate>,
}

/// Static open positions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionSettings {
    pub open_positions: Vec<String>,
}

/// External command run after every session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationSettings {
    /// Program to run; no consolidation when unset
    pub command: Option<String>,

    /// Arguments; `{run_id}` is replaced with the session's run id
    pub args: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,

    /// Log file path (if None, logs to stdout)
    pub file: Option<PathBuf>,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics while the session runs
    pub enabled: bool,

    /// Metrics export port
    pub port: u16,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            holidays: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string(), file: None }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: false, port: 9090 }
    }
}

/// Load configuration from a TOML file, then apply environment overrides
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }

    tracing::debug!("Loading configuration from file: {:?}", path);
    let mut config = load_from_file(path)?;

    load_from_env(&mut config);

    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
fn load_from_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    toml::from_str(&contents).map_err(|e| ConfigError::parse(e.to_string()))
}

/// Load configuration from environment variables
fn load_from_env(config: &mut ServiceConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut ServiceConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(level) = lookup("TRADING_SESSION_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("TRADING_SESSION_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(bypass) = lookup("TRADING_SESSION_BYPASS_MARKET_SCHEDULE") {
        config.session.bypass_market_schedule = bypass.parse().unwrap_or(false);
    }

    if let Some(scanners_only) = lookup("TRADING_SESSION_TEST_SCANNERS") {
        config.session.scanners_only = scanners_only.parse().unwrap_or(false);
    }
}

/// Validate the service-level settings
///
/// Session options (strategies, scanners, load factor) are checked by the
/// orchestrator itself.
pub fn validate_config(config: &ServiceConfig) -> Result<(), ConfigError> {
    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(ConfigError::invalid(format!("Invalid log level: {}", config.logging.level))),
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => {
            return Err(ConfigError::invalid(format!("Invalid log format: {}", config.logging.format)))
        }
    }

    if config.calendar.open >= config.calendar.close {
        return Err(ConfigError::invalid(format!(
            "Calendar open {} must be before close {}",
            config.calendar.open, config.calendar.close
        )));
    }

    // Validate metrics port
    if config.metrics.enabled && config.metrics.port == 0 {
        return Err(ConfigError::invalid(format!("Invalid metrics port: {}", config.metrics.port)));
    }

    Ok(())
}
