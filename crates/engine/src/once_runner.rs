//! Once-runner (C7): guarded setup that executes once per named pipeline
//! and caches the resulting workspace directory for restore on later runs.

use crate::executor::Executor;
use crate::fs_copy::{copy_dir_recursive, is_dir_empty};
use crate::pipeline::RunningPipeline;
use jm_core::JerminalError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct OnceRunner {
    pub name: String,
    pub executors: Vec<Executor>,
}

impl OnceRunner {
    pub fn new(name: impl Into<String>, executors: Vec<Executor>) -> Self {
        Self {
            name: name.into(),
            executors,
        }
    }

    pub async fn execute_in_pipeline(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        if pipeline.time_ran() > 0 {
            // The pipeline prologue already restored the cache into the
            // workspace; nothing to execute.
            pipeline.increment_time_ran();
            return Ok(());
        }

        let workspace = pipeline.current_dir();
        if !is_dir_empty(&workspace)? {
            return Err(JerminalError::Internal(format!(
                "once-runner `{}` requires an empty workspace, found content in {}",
                self.name,
                workspace.display()
            )));
        }

        for executor in &self.executors {
            if cancel.is_cancelled() {
                return Err(JerminalError::Cancelled);
            }
            executor.execute_main(pipeline.clone(), cancel.clone()).await?;
        }

        let cache_dir = pipeline.pipeline_cache_dir().join(&self.name);
        copy_dir_recursive(&workspace, &cache_dir)
            .await
            .map_err(|e| JerminalError::Internal(format!("caching once-runner output: {e}")))?;
        pipeline.increment_time_ran();
        Ok(())
    }
}

#[cfg(test)]
#[path = "once_runner_tests.rs"]
mod tests;
