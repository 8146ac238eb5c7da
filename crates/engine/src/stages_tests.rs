use super::*;
use crate::executable::Executable;
use crate::executor::Executor;
use crate::test_support::test_pipeline;
use async_trait::async_trait;
use std::time::{Duration, Instant};

struct SleepOneSecond;

#[async_trait]
impl Executable for SleepOneSecond {
    async fn execute(&self, _pipeline: Arc<RunningPipeline>, _cancel: CancellationToken) -> Result<(), JerminalError> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

fn sleeping_stage(name: &str) -> Stage {
    Stage::new(name, vec![Executor::new(Arc::new(SleepOneSecond))])
}

// S4 — parallel speedup: three stages each sleep 1s. Sequential: >= 3s.
// Parallel: <= 2s.
#[tokio::test]
async fn s4_sequential_mode_takes_at_least_the_sum_of_children() {
    let stages = Stages::new("seq", vec![sleeping_stage("a"), sleeping_stage("b"), sleeping_stage("c")]);
    let (pipeline, _tmp) = test_pipeline();

    let start = Instant::now();
    stages
        .execute_in_pipeline(pipeline, CancellationToken::new())
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn s4_parallel_mode_is_bounded_by_the_slowest_child() {
    let stages =
        Stages::new("par", vec![sleeping_stage("a"), sleeping_stage("b"), sleeping_stage("c")]).parallel();
    let (pipeline, _tmp) = test_pipeline();

    let start = Instant::now();
    stages
        .execute_in_pipeline(pipeline, CancellationToken::new())
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(start.elapsed() <= Duration::from_secs(2));
}

#[tokio::test]
async fn sequential_mode_stops_on_stop_if_error_stage() {
    struct AlwaysErr;
    #[async_trait]
    impl Executable for AlwaysErr {
        async fn execute(&self, _p: Arc<RunningPipeline>, _c: CancellationToken) -> Result<(), JerminalError> {
            Err(JerminalError::Executable("boom".into()))
        }
    }
    let failing = Stage::new("fail", vec![Executor::new(Arc::new(AlwaysErr))]);
    let stages = Stages::new("seq", vec![failing]);
    let (pipeline, _tmp) = test_pipeline();

    let result = stages.execute_in_pipeline(pipeline, CancellationToken::new()).await;
    assert!(result.is_err());
}
