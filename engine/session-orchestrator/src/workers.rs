//! Worker entry points and the context each one is started with

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use market_calendar::Tz;
use symbol_coordinator::Assignment;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;
use crate::types::{RunId, ScanHit};

/// Input to one consumer worker
#[derive(Debug)]
pub struct ConsumerContext {
    pub index: usize,
    pub run_id: RunId,
    /// Hits routed to this consumer by the producer
    pub queue: mpsc::Receiver<ScanHit>,
    /// Symbols this consumer owns from the start of the session
    pub symbols: Vec<String>,
    pub config: Arc<SessionConfig>,
    pub cancel: CancellationToken,
}

/// Input to the producer worker
#[derive(Debug)]
pub struct ProducerContext {
    pub run_id: RunId,
    /// One sender per consumer, indexed by worker
    pub queues: Vec<mpsc::Sender<ScanHit>>,
    /// Every tracked symbol, in seeding order
    pub symbols: Arc<Vec<String>>,
    pub assignment: Arc<Assignment>,
    pub worker_count: usize,
    pub session_close: Option<DateTime<Tz>>,
    pub config: Arc<SessionConfig>,
    /// Output of the scanner worker
    pub scanner_output: mpsc::UnboundedReceiver<ScanHit>,
    pub cancel: CancellationToken,
}

/// Input to the scanner worker
#[derive(Debug)]
pub struct ScannerContext {
    pub run_id: RunId,
    pub config: Arc<SessionConfig>,
    pub session_open: Option<DateTime<Tz>>,
    pub session_close: Option<DateTime<Tz>>,
    pub output: mpsc::UnboundedSender<ScanHit>,
    pub cancel: CancellationToken,
}

/// The three worker roles of a session
///
/// Each method runs for the lifetime of its worker. Returning an error marks the
/// worker as failed; the rest of the topology keeps running.
#[async_trait]
pub trait SessionWorkers: Send + Sync + 'static {
    async fn run_consumer(&self, ctx: ConsumerContext) -> anyhow::Result<()>;

    async fn run_producer(&self, ctx: ProducerContext) -> anyhow::Result<()>;

    async fn run_scanner(&self, ctx: ScannerContext) -> anyhow::Result<()>;
}
