//! An executor bundles a main executable with optional recovery and
//! deferred executables. The enclosing [`crate::stage::Stage`] runs
//! deferreds, not the executor itself.

use crate::executable::Executable;
use crate::pipeline::RunningPipeline;
use jm_core::JerminalError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct Executor {
    pub main: Option<Arc<dyn Executable>>,
    pub recovery: Option<Arc<dyn Executable>>,
    pub deferred: Option<Arc<dyn Executable>>,
}

impl Executor {
    pub fn new(main: Arc<dyn Executable>) -> Self {
        Self {
            main: Some(main),
            recovery: None,
            deferred: None,
        }
    }

    pub fn with_recovery(main: Arc<dyn Executable>, recovery: Arc<dyn Executable>) -> Self {
        Self {
            main: Some(main),
            recovery: Some(recovery),
            deferred: None,
        }
    }

    pub fn with_deferred(main: Arc<dyn Executable>, deferred: Arc<dyn Executable>) -> Self {
        Self {
            main: Some(main),
            recovery: None,
            deferred: Some(deferred),
        }
    }

    pub fn deferred_only(deferred: Arc<dyn Executable>) -> Self {
        Self {
            main: None,
            recovery: None,
            deferred: Some(deferred),
        }
    }

    /// Runs `main`; on error, falls back to `recovery` if present and
    /// returns its result instead. Does not run `deferred`.
    pub async fn execute_main(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        let Some(main) = &self.main else {
            return Ok(());
        };
        match main.execute(pipeline.clone(), cancel.clone()).await {
            Ok(()) => Ok(()),
            Err(main_err) => match &self.recovery {
                Some(recovery) => recovery.execute(pipeline, cancel).await,
                None => Err(main_err),
            },
        }
    }

    pub async fn execute_deferred(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        match &self.deferred {
            Some(deferred) => deferred.execute(pipeline, cancel).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
