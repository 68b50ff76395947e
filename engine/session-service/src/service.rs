//! Wires configuration into a session run

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use market_calendar::WeekdayCalendar;
use metrics_exporter_prometheus::PrometheusBuilder;
use session_orchestrator::{
    CommandConsolidator, Consolidator, NoopConsolidator, RoutingWorkers, SessionDeps,
    SessionError, SessionOrchestrator, SessionReport, StaticPositions,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{MetricsConfig, ServiceConfig};

/// One configured session, ready to run
pub struct SessionService {
    config: ServiceConfig,
}

impl SessionService {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Collaborators described by the configuration
    pub fn build_deps(&self) -> Result<SessionDeps, SessionError> {
        let calendar = WeekdayCalendar::new(self.config.calendar.open, self.config.calendar.close)?
            .with_holidays(self.config.calendar.holidays.iter().copied());

        let positions = StaticPositions::from_symbols(&self.config.positions.open_positions);

        let consolidator: Arc<dyn Consolidator> = match &self.config.consolidation.command {
            Some(command) => {
                info!("Post-session consolidation: {} {:?}", command, self.config.consolidation.args);
                Arc::new(CommandConsolidator::new(command.clone(), self.config.consolidation.args.clone()))
            }
            None => Arc::new(NoopConsolidator),
        };

        Ok(SessionDeps::new(Arc::new(calendar), Arc::new(positions), Arc::new(RoutingWorkers), consolidator)
            .with_timezone(self.config.calendar.timezone))
    }

    /// Run the session with collaborators built from the configuration
    pub async fn run(self, shutdown: CancellationToken) -> Result<SessionReport, SessionError> {
        let deps = self.build_deps()?;
        self.run_with(deps, shutdown).await
    }

    pub async fn run_with(
        self,
        deps: SessionDeps,
        shutdown: CancellationToken,
    ) -> Result<SessionReport, SessionError> {
        let orchestrator = SessionOrchestrator::new(self.config.session, deps)?;
        info!("Starting session {}", orchestrator.run_id());
        orchestrator.run(shutdown).await
    }
}

/// Serve Prometheus metrics on the configured port
pub fn install_metrics_exporter(config: &MetricsConfig) -> Result<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()
        .with_context(|| format!("Failed to start metrics exporter on {address}"))?;
    info!("Metrics exporter listening on {}", address);
    Ok(())
}

/// Process exit status for a finished run
pub fn exit_code(result: &Result<SessionReport, SessionError>) -> u8 {
    match result {
        Ok(report) => {
            info!("Session {} finished in state {}", report.run_id, report.state);
            0
        }
        Err(err) if err.exit_code() == 0 => {
            warn!("Nothing to run: {}", err);
            0
        }
        Err(err) => {
            error!("Session failed: {}", err);
            err.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market_calendar::FixedClock;
    use session_orchestrator::{ConfigError, SessionState};

    fn configured() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.session.scanners.insert("momentum".to_string(), serde_json::json!({}));
        config.session.strategies.insert("MomentumLong".to_string(), serde_json::json!({}));
        config.session.fixed_consumer_count = 1;
        config
    }

    #[tokio::test]
    async fn test_weekend_run_is_skipped_cleanly() {
        let service = SessionService::new(configured());
        let saturday = FixedClock(Utc.with_ymd_and_hms(2025, 3, 15, 15, 0, 0).unwrap());
        let deps = service.build_deps().unwrap().with_clock(Arc::new(saturday));

        let result = service.run_with(deps, CancellationToken::new()).await;

        assert_eq!(result.as_ref().map(|report| report.state).ok(), Some(SessionState::NotReady));
        assert_eq!(exit_code(&result), 0);
    }

    #[tokio::test]
    async fn test_empty_strategies_exit_cleanly() {
        let mut config = configured();
        config.session.strategies.clear();

        let result = SessionService::new(config).run(CancellationToken::new()).await;

        assert!(matches!(result, Err(SessionError::Config(ConfigError::NoStrategies))));
        assert_eq!(exit_code(&result), 0);
    }

    #[tokio::test]
    async fn test_invalid_load_factor_fails() {
        let mut config = configured();
        config.session.fixed_consumer_count = 0;
        config.session.load_factor = -1.0;

        let result = SessionService::new(config).run(CancellationToken::new()).await;

        assert_eq!(exit_code(&result), 1);
    }

    #[test]
    fn test_invalid_calendar_hours_fail() {
        let mut config = configured();
        config.calendar.close = config.calendar.open;

        let result = SessionService::new(config).build_deps();

        assert!(matches!(result, Err(SessionError::Calendar(_))));
    }
}
