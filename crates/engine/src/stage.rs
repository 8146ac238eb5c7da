//! A stage: an ordered list of executors sharing a retry policy (C5).

use crate::executor::Executor;
use crate::pipeline::RunningPipeline;
use jm_core::{Importance, JerminalError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct Stage {
    pub name: String,
    pub executors: Vec<Executor>,
    pub stop_if_error: bool,
    pub tries: u16,
    pub delay: Duration,
}

impl Stage {
    pub fn new(name: impl Into<String>, executors: Vec<Executor>) -> Self {
        Self {
            name: name.into(),
            executors,
            stop_if_error: true,
            tries: 1,
            delay: Duration::from_secs(0),
        }
    }

    pub fn dont_stop_if_err(mut self) -> Self {
        self.stop_if_error = false;
        self
    }

    pub fn retry(mut self, tries: u16, delay: Duration) -> Self {
        self.tries = tries.max(1);
        self.delay = delay;
        self
    }

    /// Runs up to `tries` attempts. Each attempt runs every executor's main
    /// in order, then — regardless of whether the main loop succeeded,
    /// errored, or cancellation fired mid-loop — runs every executor's
    /// deferred in order. A deferred error becomes the attempt's result,
    /// overriding success but not an earlier main-loop error which already
    /// takes priority only when no deferred errors.
    pub async fn execute(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        let mut last_err: Option<JerminalError> = None;
        for attempt in 1..=self.tries {
            let main_result = self.run_main_phase(pipeline.clone(), cancel.clone()).await;
            let deferred_result = self.run_deferred_phase(pipeline.clone(), cancel.clone()).await;

            let attempt_result = match (main_result, deferred_result) {
                (_, Err(deferred_err)) => Err(deferred_err),
                (Err(main_err), Ok(())) => Err(main_err),
                (Ok(()), Ok(())) => Ok(()),
            };

            match attempt_result {
                Ok(()) => return Ok(()),
                Err(JerminalError::Cancelled) => return Err(JerminalError::Cancelled),
                Err(e) => {
                    if attempt < self.tries {
                        pipeline.diagnostic_log(
                            Importance::Warn,
                            &self.name,
                            format!("attempt {attempt}/{} failed: {e}, retrying", self.tries),
                        );
                        tokio::time::sleep(self.delay).await;
                    }
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| JerminalError::Internal("stage ran zero tries".into())))
    }

    async fn run_main_phase(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        for executor in &self.executors {
            if cancel.is_cancelled() {
                return Err(JerminalError::Cancelled);
            }
            executor.execute_main(pipeline.clone(), cancel.clone()).await?;
        }
        Ok(())
    }

    async fn run_deferred_phase(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        let mut first_err = None;
        for executor in &self.executors {
            if let Err(e) = executor.execute_deferred(pipeline.clone(), cancel.clone()).await {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
