//! Stages group (C6): an ordered or concurrent set of stages sharing a
//! `stop_if_error` policy, reparenting the pipeline's diagnostic cursor for
//! the duration of the group so nested stages produce a nested subtree.

use crate::pipeline::RunningPipeline;
use crate::stage::Stage;
use jm_core::{Importance, JerminalError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct Stages {
    pub name: String,
    pub stages: Vec<Stage>,
    pub parallel: bool,
    pub stop_if_error: bool,
}

impl Stages {
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            stages,
            parallel: false,
            stop_if_error: true,
        }
    }

    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn dont_stop_if_err(mut self) -> Self {
        self.stop_if_error = false;
        self
    }

    pub async fn execute_in_pipeline(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        pipeline.push_diagnostic(self.name.clone());
        let result = if self.parallel {
            self.execute_parallel(pipeline.clone(), cancel).await
        } else {
            self.execute_sequential(pipeline.clone(), cancel).await
        };
        pipeline.pop_diagnostic();
        result
    }

    async fn execute_sequential(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        for stage in &self.stages {
            if cancel.is_cancelled() {
                return Err(JerminalError::Cancelled);
            }
            if let Err(e) = stage.execute(pipeline.clone(), cancel.clone()).await {
                if stage.stop_if_error {
                    return Err(e);
                }
                pipeline.diagnostic_log(Importance::Warn, &stage.name, e.to_string());
            }
        }
        Ok(())
    }

    /// Spawns one task per child stage. Each child that errors and has
    /// `stop_if_error=true` sends its error into a buffered channel of
    /// capacity `len(stages)`; only the first buffered error is returned,
    /// remaining ones are discarded — a documented coarse policy, not an
    /// oversight.
    async fn execute_parallel(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        let (tx, mut rx) = tokio::sync::mpsc::channel(self.stages.len().max(1));
        let mut handles = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let pipeline = pipeline.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();
            let stage = stage.clone();
            handles.push(tokio::spawn(async move {
                if let Err(e) = stage.execute(pipeline.clone(), cancel).await {
                    if stage.stop_if_error {
                        let _ = tx.send(e).await;
                    } else {
                        pipeline.diagnostic_log(Importance::Warn, &stage.name, e.to_string());
                    }
                }
            }));
        }
        drop(tx);
        for handle in handles {
            let _ = handle.await;
        }
        match rx.recv().await {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "stages_tests.rs"]
mod tests;
