//! Post-session consolidation

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{error, info};

use crate::types::RunId;

/// Work done once a session is over (reconciling trades, building reports, ...)
#[async_trait]
pub trait Consolidator: Send + Sync {
    async fn consolidate(&self, run_id: RunId) -> anyhow::Result<()>;
}

/// Runs the consolidator exactly once per run and never fails the run
pub struct PostSessionHook {
    consolidator: Arc<dyn Consolidator>,
}

impl PostSessionHook {
    pub fn new(consolidator: Arc<dyn Consolidator>) -> Self {
        Self { consolidator }
    }

    pub async fn finalize(&self, run_id: RunId) {
        info!("Running post-session consolidation for run {}", run_id);
        match self.consolidator.consolidate(run_id).await {
            Ok(()) => info!("Post-session consolidation complete for run {}", run_id),
            Err(err) => error!("Post-session consolidation failed for run {}: {:#}", run_id, err),
        }
    }
}

/// Consolidator that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopConsolidator;

#[async_trait]
impl Consolidator for NoopConsolidator {
    async fn consolidate(&self, run_id: RunId) -> anyhow::Result<()> {
        info!("No consolidation configured for run {}", run_id);
        Ok(())
    }
}

/// Runs an external command, substituting `{run_id}` in its arguments
#[derive(Debug, Clone)]
pub struct CommandConsolidator {
    program: String,
    args: Vec<String>,
}

impl CommandConsolidator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    fn render_args(&self, run_id: RunId) -> Vec<String> {
        let run_id = run_id.to_string();
        self.args.iter().map(|arg| arg.replace("{run_id}", &run_id)).collect()
    }
}

#[async_trait]
impl Consolidator for CommandConsolidator {
    async fn consolidate(&self, run_id: RunId) -> anyhow::Result<()> {
        let args = self.render_args(run_id);
        let status = tokio::process::Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .status()
            .await
            .with_context(|| format!("failed to launch {}", self.program))?;

        if !status.success() {
            anyhow::bail!("{} exited with {}", self.program, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Failing {
        calls: Mutex<Vec<RunId>>,
    }

    #[async_trait]
    impl Consolidator for Failing {
        async fn consolidate(&self, run_id: RunId) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(run_id);
            anyhow::bail!("database unavailable")
        }
    }

    #[tokio::test]
    async fn test_finalize_swallows_errors() {
        let consolidator = Arc::new(Failing::default());
        let hook = PostSessionHook::new(consolidator.clone());
        let run_id = RunId::new();

        hook.finalize(run_id).await;

        assert_eq!(*consolidator.calls.lock().unwrap(), vec![run_id]);
    }

    #[test]
    fn test_run_id_substitution() {
        let consolidator =
            CommandConsolidator::new("report", vec!["--run".to_string(), "{run_id}".to_string()]);
        let run_id = RunId::new();

        assert_eq!(consolidator.render_args(run_id), vec!["--run".to_string(), run_id.to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_exit_status() {
        assert!(CommandConsolidator::new("true", vec![]).consolidate(RunId::new()).await.is_ok());
        assert!(CommandConsolidator::new("false", vec![]).consolidate(RunId::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let consolidator = CommandConsolidator::new("definitely-not-a-real-binary-4821", vec![]);
        assert!(consolidator.consolidate(RunId::new()).await.is_err());
    }
}
