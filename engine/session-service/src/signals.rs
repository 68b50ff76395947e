//! Signal handling for graceful shutdown

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancel `shutdown` on Ctrl+C or SIGTERM
pub fn setup_signal_handlers(shutdown: CancellationToken) -> Result<()> {
    // Handle Ctrl+C (SIGINT)
    let token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C signal: {}", e);
            return;
        }

        info!("Ctrl+C signal received");
        token.cancel();
    });

    // Handle SIGTERM (Unix only)
    #[cfg(unix)]
    {
        use signal_hook::consts::SIGTERM;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let sigterm = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGTERM, Arc::clone(&sigterm))?;

        tokio::spawn(async move {
            loop {
                if sigterm.load(Ordering::Relaxed) {
                    info!("SIGTERM signal received");
                    shutdown.cancel();
                    break;
                }
                if shutdown.is_cancelled() {
                    break;
                }
                tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            }
        });
    }

    Ok(())
}
