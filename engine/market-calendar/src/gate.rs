//! Readiness gate: decides whether today's session may start

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::types::TradingWindow;
use crate::DEFAULT_SAFETY_MARGIN_SECS;

/// Gate in front of the worker topology
///
/// When the open is still ahead the gate sleeps until then (plus a safety margin).
/// Cancelling the shutdown token during that sleep aborts the run.
pub struct ReadinessGate {
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
}

impl ReadinessGate {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, safety_margin: Duration::from_secs(DEFAULT_SAFETY_MARGIN_SECS) }
    }

    pub async fn is_ready(
        &self,
        bypass_market_schedule: bool,
        window: &TradingWindow,
        shutdown: &CancellationToken,
    ) -> bool {
        if bypass_market_schedule {
            info!("Market schedule bypassed, starting session without waiting");
            return true;
        }

        let (Some(open), Some(close)) = (window.open, window.close) else {
            info!("Market is closed today, skipping session");
            return false;
        };

        let now = self.clock.now();
        if now >= close.with_timezone(&Utc) {
            info!("Market already closed at {}, skipping session", close);
            return false;
        }

        let until_open = open.with_timezone(&Utc) - now;
        if until_open <= chrono::Duration::zero() {
            info!("Market is open until {}", close);
            return true;
        }

        let wait = until_open.to_std().unwrap_or_default() + self.safety_margin;
        info!("Market opens at {}, waiting {:?}", open, wait);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                info!("Market open, proceeding with session");
                true
            }
            _ = shutdown.cancelled() => {
                warn!("Interrupted while waiting for market open, aborting run");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::DEFAULT_TIMEZONE;
    use chrono::{DateTime, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        // 2025-03-12 is a Wednesday, New York is UTC-4
        Utc.with_ymd_and_hms(2025, 3, 12, h, m, 0).unwrap()
    }

    fn regular_window() -> TradingWindow {
        TradingWindow::new(
            at(13, 30).with_timezone(&DEFAULT_TIMEZONE),
            at(20, 0).with_timezone(&DEFAULT_TIMEZONE),
        )
    }

    fn gate_at(now: DateTime<Utc>) -> ReadinessGate {
        ReadinessGate::new(Arc::new(FixedClock(now)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_market_is_ready_without_waiting() {
        let gate = gate_at(at(15, 0));
        let started = tokio::time::Instant::now();

        assert!(gate.is_ready(false, &regular_window(), &CancellationToken::new()).await);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bypass_ignores_closed_window() {
        let gate = gate_at(at(23, 0));
        let token = CancellationToken::new();

        assert!(gate.is_ready(true, &TradingWindow::closed(), &token).await);
        assert!(gate.is_ready(true, &regular_window(), &token).await);
    }

    #[tokio::test]
    async fn test_no_session_today() {
        let gate = gate_at(at(15, 0));
        assert!(!gate.is_ready(false, &TradingWindow::closed(), &CancellationToken::new()).await);
    }

    #[tokio::test]
    async fn test_after_close_is_not_ready() {
        let token = CancellationToken::new();
        assert!(!gate_at(at(20, 0)).is_ready(false, &regular_window(), &token).await);
        assert!(!gate_at(at(21, 15)).is_ready(false, &regular_window(), &token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_open_plus_margin() {
        let gate = gate_at(at(13, 20));
        let started = tokio::time::Instant::now();

        assert!(gate.is_ready(false, &regular_window(), &CancellationToken::new()).await);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10 * 60 + 1), "woke early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(10 * 60 + 2), "woke late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_wait_is_not_ready() {
        let gate = gate_at(at(12, 0));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let started = tokio::time::Instant::now();
        assert!(!gate.is_ready(false, &regular_window(), &token).await);
        assert!(started.elapsed() < Duration::from_secs(60));
    }
}
