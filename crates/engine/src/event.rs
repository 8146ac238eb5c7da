//! The three kinds of top-level pipeline event. Tagged as an enum (rather
//! than trait-object polymorphism) since matching on the variant is clearer
//! here than dynamic dispatch — there are exactly three cases and they
//! don't share a uniform construction path.

use crate::once_runner::OnceRunner;
use crate::post::Post;
use crate::stages::Stages;
use jm_core::JerminalError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::pipeline::RunningPipeline;

pub enum Event {
    Stages(Stages),
    OnceRunner(OnceRunner),
    Post(Post),
}

impl Event {
    pub fn name(&self) -> &str {
        match self {
            Event::Stages(s) => &s.name,
            Event::OnceRunner(r) => &r.name,
            Event::Post(p) => &p.name,
        }
    }

    pub fn should_stop_if_error(&self) -> bool {
        match self {
            Event::Stages(s) => s.stop_if_error,
            Event::OnceRunner(_) => true,
            // Post is terminal: its own stop-if-error is forced true.
            Event::Post(_) => true,
        }
    }

    pub async fn execute_in_pipeline(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        match self {
            Event::Stages(s) => s.execute_in_pipeline(pipeline, cancel).await,
            Event::OnceRunner(r) => r.execute_in_pipeline(pipeline, cancel).await,
            Event::Post(p) => p.execute_in_pipeline(pipeline, cancel).await,
        }
    }
}
