//! Logging and tracing setup

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize logging with defaults, honouring `RUST_LOG`
///
/// Used before the configuration is available.
pub fn initialize_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(false).with_thread_names(true).with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install default subscriber: {e}"))
}

/// Initialize logging from configuration
///
/// Output goes through a non-blocking writer; keep the returned guard alive until
/// exit so buffered lines are flushed.
pub fn initialize_logging_with_config(config: &LoggingConfig) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level: {}", config.level))?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty());
            let directory = directory.unwrap_or_else(|| std::path::Path::new("."));
            let file_name =
                path.file_name().ok_or_else(|| anyhow!("Log file path has no file name: {:?}", path))?;
            std::fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create log directory: {:?}", directory))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };
    let ansi = config.file.is_none();

    // Set up formatting layer based on format
    let fmt_layer = match config.format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        "compact" => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_target(false)
            .with_ansi(ansi)
            .boxed(),
        _ => fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .with_thread_names(true)
            .with_ansi(ansi)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install subscriber: {e}"))?;

    Ok(guard)
}
