//! Trading Session Service Library
//!
//! Configuration loading, logging, signal handling and wiring for the
//! `trading-session` binary, which runs exactly one session per invocation.

pub mod config;
pub mod logging;
pub mod service;
pub mod signals;

pub use config::{load_config, validate_config, ServiceConfig};
pub use logging::{initialize_logging, initialize_logging_with_config};
pub use service::{exit_code, install_metrics_exporter, SessionService};
pub use signals::setup_signal_handlers;
