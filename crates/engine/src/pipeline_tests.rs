use super::*;
use crate::executable::{Executable, Inline};
use crate::executor::Executor;
use crate::report::{ReportSink, ReportType};
use crate::stage::Stage;
use crate::stages::Stages;
use async_trait::async_trait;
use jm_core::AgentPool;
use std::time::Duration;

fn config(tmp: &tempfile::TempDir) -> Config {
    Config {
        agent_dir: tmp.path().join("agents"),
        pipeline_dir: tmp.path().join("pipeline"),
        report_dir: tmp.path().join("reports"),
        ..Default::default()
    }
}

#[tokio::test]
async fn successful_run_increments_template_time_ran_and_writes_report() {
    let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let pool = AgentPool::new(tmp.path().join("agents"));
    let stage = Stage::new(
        "build",
        vec![Executor::new(Arc::new(Inline::new(|_p, _c| async move { Ok(()) })))],
    );
    let template = PipelineTemplate::new("ok-pipeline", AgentProvider::Default, vec![Event::Stages(Stages::new("root", vec![stage]))]);
    let sink = ReportSink::new(tmp.path().join("reports"), vec![ReportType::Json], Importance::Debug);

    let pipeline = execute_pipeline(
        PipelineId::new("run-1"),
        &template,
        &pool,
        config(&tmp),
        CancellationToken::new(),
        &sink,
    )
    .await
    .unwrap_or_else(|e| panic!("{e}"));

    assert!(!pipeline.in_error());
    assert!(!pipeline.was_cancelled());
    assert_eq!(template.time_ran.load(std::sync::atomic::Ordering::SeqCst), 1);

    let report_path = tmp.path().join("reports").join("ok-pipeline").join("run-1.json");
    assert!(report_path.exists());
}

// S7 — cancel mid-pipeline: a long-sleeping stage is cancelled from outside
// and the run reports `was_cancelled()` without marking `in_error`.
#[tokio::test]
async fn cancelling_mid_run_is_reported_without_marking_in_error() {
    struct SleepUntilCancelled;
    #[async_trait]
    impl Executable for SleepUntilCancelled {
        async fn execute(&self, _pipeline: Arc<RunningPipeline>, cancel: CancellationToken) -> Result<(), JerminalError> {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(10)) => Ok(()),
                _ = cancel.cancelled() => Err(JerminalError::Cancelled),
            }
        }
    }

    let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let pool = AgentPool::new(tmp.path().join("agents"));
    let stage = Stage::new("hang", vec![Executor::new(Arc::new(SleepUntilCancelled))]);
    let template = PipelineTemplate::new(
        "cancel-pipeline",
        AgentProvider::Default,
        vec![Event::Stages(Stages::new("root", vec![stage]))],
    );
    let sink = ReportSink::new(tmp.path().join("reports"), vec![ReportType::Json], Importance::Debug);
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    let run = tokio::spawn(async move {
        execute_pipeline(PipelineId::new("run-2"), &template, &pool, config(&tmp), cancel_clone, &sink).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let pipeline = run
        .await
        .unwrap_or_else(|e| panic!("join: {e}"))
        .unwrap_or_else(|e| panic!("{e}"));

    assert!(pipeline.was_cancelled());
    assert!(!pipeline.in_error());
}
