//! Core types shared by the topology and the orchestrator

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one orchestrator run, passed to the post-session hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A symbol surfaced by a scanner, routed by the producer to its consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanHit {
    pub symbol: String,
    pub scanner: String,
    pub detected_at: DateTime<Utc>,
}

impl ScanHit {
    pub fn new(symbol: impl Into<String>, scanner: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), scanner: scanner.into(), detected_at: Utc::now() }
    }
}

/// Role of a worker in the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkerKind {
    Scanner,
    Producer,
    Consumer(usize),
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::Scanner => write!(f, "scanner"),
            WorkerKind::Producer => write!(f, "producer"),
            WorkerKind::Consumer(index) => write!(f, "consumer-{index}"),
        }
    }
}

/// How a worker's task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    Completed,
    Failed(String),
    Panicked,
    Aborted,
}

/// Lifecycle events recorded by the topology, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyEvent {
    Started(WorkerKind),
    Joined(WorkerKind, WorkerExit),
    TerminateRequested(WorkerKind),
}

/// Orchestrator state machine
///
/// `Idle -> Gated -> {NotReady | Running}`, then `Running -> {Completed | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Gated,
    NotReady,
    Running,
    Completed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::NotReady | SessionState::Completed | SessionState::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Gated => "gated",
            SessionState::NotReady => "not_ready",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn test_worker_kind_display() {
        assert_eq!(WorkerKind::Consumer(3).to_string(), "consumer-3");
        assert_eq!(WorkerKind::Producer.to_string(), "producer");
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::NotReady.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(!SessionState::Running.is_terminal());
        assert!(!SessionState::Gated.is_terminal());
    }
}
