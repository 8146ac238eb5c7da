use super::*;
use crate::event::Event;
use crate::executable::{Executable, Inline};
use crate::once_runner::OnceRunner;
use crate::executor::Executor;
use jm_core::AgentPool;
use std::sync::Arc;
use std::time::Duration;

fn store_with_tmp() -> (PipelineStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let pool = Arc::new(AgentPool::new(tmp.path().join("agents")));
    let config = Config {
        agent_dir: tmp.path().join("agents"),
        pipeline_dir: tmp.path().join("pipeline"),
        report_dir: tmp.path().join("reports"),
        secret: "shh".into(),
        ..Default::default()
    };
    (PipelineStore::new(pool, config), tmp)
}

#[tokio::test]
async fn unknown_pipeline_name_is_not_found() {
    let (store, _tmp) = store_with_tmp();
    let result = store.begin_pipeline("nope");
    assert!(matches!(result, Err(JerminalError::NotFound(_))));
}

#[tokio::test]
async fn begin_pipeline_tracks_then_clears_the_active_entry() {
    let (store, _tmp) = store_with_tmp();
    let once = OnceRunner::new(
        "setup",
        vec![Executor::new(Arc::new(Inline::new(|_p, _c| async move { Ok(()) })))],
    );
    store.set_pipelines(vec![PipelineTemplate::new(
        "noop",
        crate::pipeline::AgentProvider::Default,
        vec![Event::OnceRunner(once)],
    )]);

    let (id, handle) = store.begin_pipeline("noop").unwrap_or_else(|e| panic!("{e}"));
    assert!(store.active().iter().any(|(i, _)| i == &id));

    handle.await.unwrap_or_else(|e| panic!("join: {e}"));
    assert!(store.active().is_empty());
}

#[tokio::test]
async fn cancel_pipeline_signals_its_token() {
    let (store, _tmp) = store_with_tmp();
    struct SleepForever;
    #[async_trait::async_trait]
    impl Executable for SleepForever {
        async fn execute(
            &self,
            _pipeline: Arc<crate::pipeline::RunningPipeline>,
            cancel: tokio_util::sync::CancellationToken,
        ) -> Result<(), JerminalError> {
            cancel.cancelled().await;
            Err(JerminalError::Cancelled)
        }
    }
    let once = OnceRunner::new("setup", vec![Executor::new(Arc::new(SleepForever))]);
    store.set_pipelines(vec![PipelineTemplate::new(
        "hangs",
        crate::pipeline::AgentProvider::Default,
        vec![Event::OnceRunner(once)],
    )]);

    let (id, handle) = store.begin_pipeline("hangs").unwrap_or_else(|e| panic!("{e}"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    let rejected = store.cancel_pipeline(&id, "wrong");
    assert!(matches!(rejected, Err(JerminalError::Unauthorized(_))));

    store.cancel_pipeline(&id, "shh").unwrap_or_else(|e| panic!("{e}"));
    handle.await.unwrap_or_else(|e| panic!("join: {e}"));
    assert!(store.active().is_empty());
}
