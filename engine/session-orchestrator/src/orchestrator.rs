//! Session orchestrator: one run from window resolution to post-session hook

use std::sync::Arc;

use market_calendar::{
    CalendarSource, Clock, MarketWindowResolver, ReadinessGate, SystemClock, TradingWindow, Tz,
    DEFAULT_TIMEZONE,
};
use symbol_coordinator::{
    consumer_count, partition, Assignment, HostProbe, OsRandom, RandomSource, SystemProbe,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::hook::{Consolidator, PostSessionHook};
use crate::positions::{seed_symbols, PositionSource};
use crate::topology::{ProcessTopology, SupervisionOutcome, TopologyPlan};
use crate::types::{RunId, SessionState, TopologyEvent};
use crate::workers::SessionWorkers;

/// External collaborators of a run
pub struct SessionDeps {
    pub calendar: Arc<dyn CalendarSource>,
    pub positions: Arc<dyn PositionSource>,
    pub workers: Arc<dyn SessionWorkers>,
    pub consolidator: Arc<dyn Consolidator>,
    pub clock: Arc<dyn Clock>,
    pub probe: Arc<dyn SystemProbe>,
    pub random: Box<dyn RandomSource>,
    pub timezone: Tz,
}

impl SessionDeps {
    /// Host clock, host probe, OS randomness and the New York session zone
    pub fn new(
        calendar: Arc<dyn CalendarSource>,
        positions: Arc<dyn PositionSource>,
        workers: Arc<dyn SessionWorkers>,
        consolidator: Arc<dyn Consolidator>,
    ) -> Self {
        Self {
            calendar,
            positions,
            workers,
            consolidator,
            clock: Arc::new(SystemClock),
            probe: Arc::new(HostProbe),
            random: Box::new(OsRandom),
            timezone: DEFAULT_TIMEZONE,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn SystemProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }
}

/// Outcome of a run that reached a terminal state
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub run_id: RunId,
    pub state: SessionState,
    pub window: TradingWindow,
    pub consumer_count: usize,
    pub assignment: Option<Arc<Assignment>>,
    pub events: Vec<TopologyEvent>,
    /// Scanner hits dropped in scanner-only mode
    pub discarded_scan_hits: u64,
}

/// Drives a single session through `Idle -> Gated -> Running -> Completed`
pub struct SessionOrchestrator {
    config: Arc<SessionConfig>,
    deps: SessionDeps,
    run_id: RunId,
    state: SessionState,
}

impl SessionOrchestrator {
    pub fn new(config: SessionConfig, deps: SessionDeps) -> Result<Self, SessionError> {
        config.validate()?;

        let run_id = RunId::new();
        for (name, settings) in &config.scanners {
            info!("Session {} scanner {}: {}", run_id, name, settings);
        }
        info!(
            "Session {} configured with strategies {:?}",
            run_id,
            config.strategies.keys().collect::<Vec<_>>()
        );

        Ok(Self { config: Arc::new(config), deps, run_id, state: SessionState::Idle })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {} state {} -> {}", self.run_id, self.state, next);
        self.state = next;
    }

    /// Run the session until it completes, is skipped, or `shutdown` fires
    ///
    /// Errors are returned before any worker starts and skip the post-session
    /// hook. Every terminal state runs the hook exactly once.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<SessionReport, SessionError> {
        let result = self.run_session(&shutdown).await;
        match &result {
            Ok(report) => {
                metrics::increment_counter!("session_runs_total", "outcome" => report.state.as_str());
            }
            Err(err) => {
                error!("Session {} failed: {}", self.run_id, err);
                metrics::increment_counter!("session_runs_total", "outcome" => "error");
            }
        }
        result
    }

    async fn run_session(
        &mut self,
        shutdown: &CancellationToken,
    ) -> Result<SessionReport, SessionError> {
        let resolver = MarketWindowResolver::new(self.deps.timezone);
        let window = resolver.resolve(self.deps.clock.now(), self.deps.calendar.as_ref()).await?;
        info!("Trading window for session {}: {}", self.run_id, window);

        self.transition(SessionState::Gated);
        let gate = ReadinessGate::new(Arc::clone(&self.deps.clock));
        let hook = PostSessionHook::new(Arc::clone(&self.deps.consolidator));

        if !gate.is_ready(self.config.bypass_market_schedule, &window, shutdown).await {
            self.transition(SessionState::NotReady);
            hook.finalize(self.run_id).await;
            return Ok(self.report(window, 0, None, Vec::new()));
        }

        let worker_count = consumer_count(&self.config.pool_sizing(), self.deps.probe.as_ref())?;
        metrics::gauge!("session_consumer_workers", worker_count as f64);

        let symbols = seed_symbols(self.deps.positions.as_ref(), self.config.skip_existing_positions)
            .await
            .map_err(|err| SessionError::positions(format!("{err:#}")))?;
        metrics::gauge!("session_symbols_tracked", symbols.len() as f64);

        let assignment = Arc::new(partition(&symbols, worker_count, self.deps.random.as_mut())?);
        for (worker, owned) in assignment.by_worker() {
            info!("Consumer {} assigned {:?}", worker, owned);
        }

        let plan = TopologyPlan {
            run_id: self.run_id,
            config: Arc::clone(&self.config),
            window,
            symbols: Arc::new(symbols.into_vec()),
            assignment: Arc::clone(&assignment),
            worker_count,
        };

        self.transition(SessionState::Running);
        let mut topology = ProcessTopology::start(plan, Arc::clone(&self.deps.workers));
        let outcome = topology.supervise(shutdown).await;

        self.transition(match outcome {
            SupervisionOutcome::Completed => SessionState::Completed,
            SupervisionOutcome::Cancelled => SessionState::Cancelled,
        });
        hook.finalize(self.run_id).await;

        info!("Session {} ended: {}", self.run_id, self.state);
        let discarded_scan_hits = topology.discarded_scan_hits();
        let mut report = self.report(window, worker_count, Some(assignment), topology.into_events());
        report.discarded_scan_hits = discarded_scan_hits;
        Ok(report)
    }

    fn report(
        &self,
        window: TradingWindow,
        consumer_count: usize,
        assignment: Option<Arc<Assignment>>,
        events: Vec<TopologyEvent>,
    ) -> SessionReport {
        SessionReport {
            run_id: self.run_id,
            state: self.state,
            window,
            consumer_count,
            assignment,
            events,
            discarded_scan_hits: 0,
        }
    }
}
