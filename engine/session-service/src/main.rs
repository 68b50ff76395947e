//! Trading Session Service
//!
//! Runs one trading session: waits for the market open (unless bypassed),
//! supervises the worker topology until the close or a shutdown signal, then
//! runs post-session consolidation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use session_service::{
    exit_code, initialize_logging, initialize_logging_with_config, install_metrics_exporter,
    load_config, setup_signal_handlers, validate_config, SessionService,
};

#[derive(Parser, Debug)]
#[command(name = "trading-session")]
#[command(about = "Run one trading session")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "trading_session.toml")]
    config: PathBuf,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,

    /// Start immediately, ignoring the market schedule
    #[arg(long)]
    bypass_market_schedule: bool,

    /// Run the scanner only, without producer and consumers
    #[arg(long)]
    test_scanners: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            let _ = initialize_logging();
            if e.is_skip() {
                warn!("{}, nothing to run", e);
                return ExitCode::SUCCESS;
            }
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Command-line flags win over file and environment
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.session.bypass_market_schedule |= cli.bypass_market_schedule;
    config.session.scanners_only |= cli.test_scanners;

    if let Err(e) = validate_config(&config) {
        let _ = initialize_logging();
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let _log_guard = match initialize_logging_with_config(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting Trading Session Service v{}", env!("CARGO_PKG_VERSION"));

    if config.metrics.enabled {
        if let Err(e) = install_metrics_exporter(&config.metrics) {
            warn!("Continuing without metrics: {:#}", e);
        }
    }

    let shutdown = CancellationToken::new();
    if let Err(e) = setup_signal_handlers(shutdown.clone()) {
        error!("Failed to install signal handlers: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = SessionService::new(config).run(shutdown).await;
    let code = exit_code(&result);

    info!("Trading Session Service exiting with status {}", code);
    ExitCode::from(code)
}
