//! Owned handle to one running worker

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{WorkerExit, WorkerKind};

/// A spawned worker task plus the token that asks it to stop
///
/// `terminate` is forceful: the token is cancelled for cooperative workers and the
/// task is aborted at its next await point for everyone else.
pub struct WorkerHandle {
    kind: WorkerKind,
    task: Option<JoinHandle<anyhow::Result<()>>>,
    cancel: CancellationToken,
    terminate_requested: bool,
}

impl WorkerHandle {
    /// Spawn a worker; `start` receives the token the worker should watch
    pub fn spawn<F, Fut>(kind: WorkerKind, start: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(start(cancel.clone()));
        debug!("Spawned {} worker", kind);
        Self { kind, task: Some(task), cancel, terminate_requested: false }
    }

    pub fn kind(&self) -> WorkerKind {
        self.kind
    }

    /// Wait for the worker to finish
    ///
    /// Cancel-safe: dropping the returned future leaves the task running and joinable.
    pub async fn join(&mut self) -> WorkerExit {
        let Some(task) = self.task.as_mut() else {
            return WorkerExit::Aborted;
        };

        let exit = match task.await {
            Ok(Ok(())) => WorkerExit::Completed,
            Ok(Err(err)) => WorkerExit::Failed(format!("{err:#}")),
            Err(err) if err.is_panic() => WorkerExit::Panicked,
            Err(_) => WorkerExit::Aborted,
        };
        self.task = None;
        exit
    }

    /// Request termination; returns false if it was already requested
    pub fn terminate(&mut self) -> bool {
        if self.terminate_requested {
            return false;
        }
        self.terminate_requested = true;
        self.cancel.cancel();
        if let Some(task) = &self.task {
            task.abort();
        }
        true
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    pub fn terminate_requested(&self) -> bool {
        self.terminate_requested
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("kind", &self.kind)
            .field("finished", &self.is_finished())
            .field("terminate_requested", &self.terminate_requested)
            .finish()
    }
}
