//! Process topology: starts, supervises and tears down the session workers
//!
//! Start order is consumers, then producer, then scanner, so every queue has a
//! reader before anything writes to it. Supervision joins producer, scanner and
//! consumers in that order; cancellation during any join terminates everything.

use std::sync::Arc;

use market_calendar::TradingWindow;
use symbol_coordinator::Assignment;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::handle::WorkerHandle;
use crate::types::{RunId, ScanHit, TopologyEvent, WorkerExit, WorkerKind};
use crate::workers::{ConsumerContext, ProducerContext, ScannerContext, SessionWorkers};

/// Everything the topology needs to start one session
#[derive(Debug, Clone)]
pub struct TopologyPlan {
    pub run_id: RunId,
    pub config: Arc<SessionConfig>,
    pub window: TradingWindow,
    pub symbols: Arc<Vec<String>>,
    pub assignment: Arc<Assignment>,
    pub worker_count: usize,
}

/// How supervision ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionOutcome {
    /// Every worker finished on its own
    Completed,
    /// Shutdown was requested and all workers were terminated
    Cancelled,
}

/// The running set of workers for one session
pub struct ProcessTopology {
    consumers: Vec<WorkerHandle>,
    producer: Option<WorkerHandle>,
    scanner: WorkerHandle,
    /// Scanner output when no producer reads it
    scanner_drain: Option<ScanDrain>,
    events: Vec<TopologyEvent>,
}

impl ProcessTopology {
    /// Spawn the workers described by `plan`
    pub fn start(plan: TopologyPlan, workers: Arc<dyn SessionWorkers>) -> Self {
        let mut events = Vec::new();
        let (scan_tx, scan_rx) = mpsc::unbounded_channel();
        let mut consumers = Vec::new();
        let mut producer = None;
        let mut scanner_drain = None;

        if plan.config.scanners_only {
            info!("Scanner-only mode, producer and consumers are not started");
            scanner_drain = Some(ScanDrain::new(scan_rx));
        } else {
            let mut queues = Vec::with_capacity(plan.worker_count);
            for index in 0..plan.worker_count {
                let (queue_tx, queue_rx) = mpsc::channel(plan.config.consumer_queue_depth);
                queues.push(queue_tx);

                let run_id = plan.run_id;
                let symbols = plan.assignment.symbols_for(index).to_vec();
                let config = Arc::clone(&plan.config);
                let workers = Arc::clone(&workers);
                let handle = WorkerHandle::spawn(WorkerKind::Consumer(index), move |cancel| async move {
                    let ctx = ConsumerContext { index, run_id, queue: queue_rx, symbols, config, cancel };
                    workers.run_consumer(ctx).await
                });
                record_start(&mut events, handle.kind());
                consumers.push(handle);
            }
            info!("Started {} consumer workers", consumers.len());

            let run_id = plan.run_id;
            let symbols = Arc::clone(&plan.symbols);
            let assignment = Arc::clone(&plan.assignment);
            let worker_count = plan.worker_count;
            let session_close = plan.window.close;
            let config = Arc::clone(&plan.config);
            let workers = Arc::clone(&workers);
            let handle = WorkerHandle::spawn(WorkerKind::Producer, move |cancel| async move {
                let ctx = ProducerContext {
                    run_id,
                    queues,
                    symbols,
                    assignment,
                    worker_count,
                    session_close,
                    config,
                    scanner_output: scan_rx,
                    cancel,
                };
                workers.run_producer(ctx).await
            });
            record_start(&mut events, handle.kind());
            producer = Some(handle);
        }

        let run_id = plan.run_id;
        let config = Arc::clone(&plan.config);
        let (session_open, session_close) = (plan.window.open, plan.window.close);
        let scanner = WorkerHandle::spawn(WorkerKind::Scanner, move |cancel| async move {
            let ctx = ScannerContext { run_id, config, session_open, session_close, output: scan_tx, cancel };
            workers.run_scanner(ctx).await
        });
        record_start(&mut events, scanner.kind());

        Self { consumers, producer, scanner, scanner_drain, events }
    }

    /// Join every worker, or terminate them all once `shutdown` fires
    pub async fn supervise(&mut self, shutdown: &CancellationToken) -> SupervisionOutcome {
        if let Some(producer) = self.producer.as_mut() {
            if !join_or_cancel(producer, shutdown, &mut self.events, None).await {
                self.terminate_all();
                return SupervisionOutcome::Cancelled;
            }
        }

        let drain = self.scanner_drain.as_mut();
        if !join_or_cancel(&mut self.scanner, shutdown, &mut self.events, drain).await {
            self.terminate_all();
            return SupervisionOutcome::Cancelled;
        }

        for index in 0..self.consumers.len() {
            if !join_or_cancel(&mut self.consumers[index], shutdown, &mut self.events, None).await {
                self.terminate_all();
                return SupervisionOutcome::Cancelled;
            }
        }

        info!("All session workers finished");
        SupervisionOutcome::Completed
    }

    /// Send one terminate request to every started worker, finished or not
    pub fn terminate_all(&mut self) {
        warn!("Terminating all session workers");
        let handles = self
            .producer
            .iter_mut()
            .chain(std::iter::once(&mut self.scanner))
            .chain(self.consumers.iter_mut());

        for handle in handles {
            if handle.terminate() {
                self.events.push(TopologyEvent::TerminateRequested(handle.kind()));
                metrics::increment_counter!("session_workers_terminated_total");
            }
        }
        if let Some(drain) = self.scanner_drain.as_mut() {
            drain.close();
        }
    }

    /// Scanner hits read and dropped because no producer was running
    pub fn discarded_scan_hits(&self) -> u64 {
        self.scanner_drain.as_ref().map_or(0, |drain| drain.discarded)
    }

    pub fn into_events(self) -> Vec<TopologyEvent> {
        self.events
    }
}

fn record_start(events: &mut Vec<TopologyEvent>, kind: WorkerKind) {
    events.push(TopologyEvent::Started(kind));
    metrics::increment_counter!("session_workers_started_total");
}

/// Reads and drops scanner output in scanner-only mode
struct ScanDrain {
    output: mpsc::UnboundedReceiver<ScanHit>,
    discarded: u64,
}

impl ScanDrain {
    fn new(output: mpsc::UnboundedReceiver<ScanHit>) -> Self {
        Self { output, discarded: 0 }
    }

    fn discard(&mut self, hit: ScanHit) {
        debug!("Scanner-only mode, dropping {} from {}", hit.symbol, hit.scanner);
        self.discarded += 1;
    }

    /// Drop whatever is already buffered
    fn flush(&mut self) {
        while let Ok(hit) = self.output.try_recv() {
            self.discard(hit);
        }
    }

    fn close(&mut self) {
        self.output.close();
        self.flush();
    }
}

enum JoinStep {
    Cancelled,
    Joined(WorkerExit),
    Hit(ScanHit),
}

async fn next_hit(drain: Option<&mut ScanDrain>) -> Option<ScanHit> {
    match drain {
        Some(drain) => drain.output.recv().await,
        None => None,
    }
}

/// Join one worker; false means shutdown fired first
///
/// With a drain, scanner output is consumed while waiting so it never piles up.
async fn join_or_cancel(
    handle: &mut WorkerHandle,
    shutdown: &CancellationToken,
    events: &mut Vec<TopologyEvent>,
    mut drain: Option<&mut ScanDrain>,
) -> bool {
    let kind = handle.kind();
    let join = handle.join();
    tokio::pin!(join);

    loop {
        let step = tokio::select! {
            biased;
            _ = shutdown.cancelled() => JoinStep::Cancelled,
            exit = &mut join => JoinStep::Joined(exit),
            Some(hit) = next_hit(drain.as_deref_mut()) => JoinStep::Hit(hit),
        };

        match step {
            JoinStep::Cancelled => return false,
            JoinStep::Joined(exit) => {
                match &exit {
                    WorkerExit::Completed => info!("{} worker finished", kind),
                    other => warn!("{} worker ended abnormally: {:?}", kind, other),
                }
                events.push(TopologyEvent::Joined(kind, exit));
                if let Some(drain) = drain.as_deref_mut() {
                    drain.flush();
                    info!("Scanner-only mode dropped {} hits", drain.discarded);
                }
                return true;
            }
            JoinStep::Hit(hit) => {
                if let Some(drain) = drain.as_deref_mut() {
                    drain.discard(hit);
                }
            }
        }
    }
}
