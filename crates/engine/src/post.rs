//! Post hook (C8): success/failure/always branches evaluated after the
//! main events, regardless of `in_error`.

use crate::executable::Executable;
use crate::pipeline::RunningPipeline;
use jm_core::JerminalError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct Post {
    pub name: String,
    pub success: Option<Arc<dyn Executable>>,
    pub failure: Option<Arc<dyn Executable>>,
    pub always: Option<Arc<dyn Executable>>,
}

impl Post {
    pub fn new(
        success: Option<Arc<dyn Executable>>,
        failure: Option<Arc<dyn Executable>>,
        always: Option<Arc<dyn Executable>>,
    ) -> Self {
        Self {
            name: "post".into(),
            success,
            failure,
            always,
        }
    }

    pub async fn execute_in_pipeline(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        pipeline.push_diagnostic(&self.name);

        let branch_result = if pipeline.in_error() {
            match &self.failure {
                Some(f) => f.execute(pipeline.clone(), cancel.clone()).await,
                None => Ok(()),
            }
        } else {
            match &self.success {
                Some(s) => s.execute(pipeline.clone(), cancel.clone()).await,
                None => Ok(()),
            }
        };

        let always_result = match &self.always {
            Some(a) => a.execute(pipeline.clone(), cancel).await,
            None => Ok(()),
        };

        pipeline.pop_diagnostic();

        branch_result.and(always_result)
    }
}

#[cfg(test)]
#[path = "post_tests.rs"]
mod tests;
