//! Reference worker set: routes scanner hits to the consumer that owns the symbol

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_calendar::Tz;
use symbol_coordinator::{HashBasedPolicy, PlacementPolicy};
use tracing::{debug, info, warn};

use crate::workers::{ConsumerContext, ProducerContext, ScannerContext, SessionWorkers};

/// Workers that move hits through the topology without trading on them
///
/// The scanner idles until the close, the producer forwards each hit to the
/// consumer owning its symbol (symbols first seen mid-session are placed by hash),
/// and consumers log what they receive.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoutingWorkers;

/// Sleep until `close`, or forever when there is no deadline
async fn sleep_until_close(close: Option<DateTime<Tz>>) {
    match close {
        Some(close) => {
            let remaining = (close.with_timezone(&Utc) - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(remaining).await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Bypassed sessions run until cancelled rather than stopping at today's close
fn deadline(close: Option<DateTime<Tz>>, bypass: bool) -> Option<DateTime<Tz>> {
    if bypass {
        None
    } else {
        close
    }
}

#[async_trait]
impl SessionWorkers for RoutingWorkers {
    async fn run_consumer(&self, mut ctx: ConsumerContext) -> anyhow::Result<()> {
        info!("Consumer {} started with {} symbols for run {}", ctx.index, ctx.symbols.len(), ctx.run_id);

        let mut handled = 0u64;
        loop {
            tokio::select! {
                _ = ctx.cancel.cancelled() => break,
                hit = ctx.queue.recv() => match hit {
                    Some(hit) => {
                        debug!(
                            "Consumer {} received {} from {} (run {})",
                            ctx.index, hit.symbol, hit.scanner, ctx.run_id
                        );
                        handled += 1;
                    }
                    None => break,
                },
            }
        }

        info!("Consumer {} finished after {} hits", ctx.index, handled);
        Ok(())
    }

    async fn run_producer(&self, mut ctx: ProducerContext) -> anyhow::Result<()> {
        let late_placement = HashBasedPolicy::new(ctx.worker_count);
        let close = deadline(ctx.session_close, ctx.config.bypass_market_schedule);
        let until_close = sleep_until_close(close);
        tokio::pin!(until_close);

        info!(
            "Producer routing {} symbols to {} consumers for run {}",
            ctx.symbols.len(),
            ctx.queues.len(),
            ctx.run_id
        );

        let mut routed = 0u64;
        loop {
            tokio::select! {
                _ = ctx.cancel.cancelled() => break,
                _ = &mut until_close => {
                    info!("Session close reached, producer stopping");
                    break;
                }
                hit = ctx.scanner_output.recv() => {
                    let Some(mut hit) = hit else {
                        info!("Scanner output closed, producer stopping");
                        break;
                    };
                    hit.symbol = hit.symbol.trim().to_lowercase();

                    let worker = ctx
                        .assignment
                        .worker_for(&hit.symbol)
                        .unwrap_or_else(|| late_placement.assign_worker(&hit.symbol));
                    let Some(queue) = ctx.queues.get(worker) else {
                        warn!("No queue for consumer {}, dropping {}", worker, hit.symbol);
                        continue;
                    };
                    if queue.send(hit).await.is_err() {
                        warn!("Consumer {} queue closed", worker);
                    } else {
                        routed += 1;
                    }
                }
            }
        }

        info!("Producer finished after routing {} hits", routed);
        Ok(())
    }

    async fn run_scanner(&self, ctx: ScannerContext) -> anyhow::Result<()> {
        info!(
            "Scanner running {:?} for run {}",
            ctx.config.scanners.keys().collect::<Vec<_>>(),
            ctx.run_id
        );

        let close = deadline(ctx.session_close, ctx.config.bypass_market_schedule);
        tokio::select! {
            _ = ctx.cancel.cancelled() => info!("Scanner cancelled"),
            _ = sleep_until_close(close) => info!("Session close reached, scanner stopping"),
        }
        Ok(())
    }
}
