//! # SessionOrchestrator
//!
//! Runs one trading session end to end: resolve the market window, pass the
//! readiness gate, size the consumer pool, spread the tracked symbols over it, start
//! the worker topology and supervise it to completion or cancellation. The
//! post-session hook runs exactly once whichever way the run ends.
//!
//! Worker logic (scanning, signal production, execution) lives behind the
//! [`SessionWorkers`] trait; the orchestrator only wires channels and owns handles.

pub mod config;
pub mod error;
pub mod handle;
pub mod hook;
pub mod orchestrator;
pub mod positions;
pub mod routing;
pub mod topology;
pub mod types;
pub mod workers;


pub use config::SessionConfig;
pub use error::{ConfigError, SessionError};
pub use handle::WorkerHandle;
pub use hook::{CommandConsolidator, Consolidator, NoopConsolidator, PostSessionHook};
pub use orchestrator::{SessionDeps, SessionOrchestrator, SessionReport};
pub use positions::{seed_symbols, OpenPosition, PositionSource, StaticPositions};
pub use routing::RoutingWorkers;
pub use topology::{ProcessTopology, SupervisionOutcome, TopologyPlan};
pub use types::{RunId, ScanHit, SessionState, TopologyEvent, WorkerExit, WorkerKind};
pub use workers::{ConsumerContext, ProducerContext, ScannerContext, SessionWorkers};

/// Re-export commonly used types
pub use market_calendar::{TradingWindow, Tz};
pub use symbol_coordinator::{Assignment, SymbolSet};

/// Default bound on each consumer's queue
pub const DEFAULT_CONSUMER_QUEUE_DEPTH: usize = 1024;
