use super::*;
use crate::executable::Executable;
use crate::test_support::test_pipeline;
use async_trait::async_trait;

struct Mkdir(String);

#[async_trait]
impl Executable for Mkdir {
    async fn execute(&self, pipeline: Arc<RunningPipeline>, _cancel: CancellationToken) -> Result<(), JerminalError> {
        tokio::fs::create_dir_all(pipeline.current_dir().join(&self.0)).await?;
        Ok(())
    }
}

// S5 — once-runner cache restore: first run executes `mkdir test` in the
// workspace; assert `<cache>/<name>/test` exists after. Second (simulated)
// run: workspace already contains `test/` via the pipeline prologue, and
// `time_ran > 0` means the once-runner's executables do not run again.
#[tokio::test]
async fn s5_first_run_executes_and_populates_cache() {
    let runner = OnceRunner::new("setup", vec![Executor::new(Arc::new(Mkdir("test".into())))]);
    let (pipeline, _tmp) = test_pipeline();

    runner
        .execute_in_pipeline(pipeline.clone(), CancellationToken::new())
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    let cached = pipeline.pipeline_cache_dir().join("setup").join("test");
    assert!(cached.exists());
    assert_eq!(pipeline.time_ran(), 1);
}

#[tokio::test]
async fn s5_second_run_skips_executables_when_time_ran_is_nonzero() {
    let marker = Arc::new(tokio::sync::Mutex::new(0u32));
    struct CountingMkdir(String, Arc<tokio::sync::Mutex<u32>>);
    #[async_trait]
    impl Executable for CountingMkdir {
        async fn execute(
            &self,
            pipeline: Arc<RunningPipeline>,
            _cancel: CancellationToken,
        ) -> Result<(), JerminalError> {
            *self.1.lock().await += 1;
            tokio::fs::create_dir_all(pipeline.current_dir().join(&self.0)).await?;
            Ok(())
        }
    }

    let runner = OnceRunner::new("setup", vec![Executor::new(Arc::new(CountingMkdir("test".into(), marker.clone())))]);
    let (pipeline, _tmp) = test_pipeline();

    // Simulate the pipeline prologue having already restored the cache and
    // having run once before.
    tokio::fs::create_dir_all(pipeline.current_dir().join("test"))
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    pipeline.increment_time_ran();

    runner
        .execute_in_pipeline(pipeline.clone(), CancellationToken::new())
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(*marker.lock().await, 0, "executables must not run on a restored workspace");
    assert_eq!(pipeline.time_ran(), 2);
}

#[tokio::test]
async fn dirty_workspace_is_rejected() {
    let runner = OnceRunner::new("setup", vec![]);
    let (pipeline, _tmp) = test_pipeline();
    tokio::fs::write(pipeline.current_dir().join("leftover"), b"x")
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    let result = runner.execute_in_pipeline(pipeline, CancellationToken::new()).await;
    assert!(result.is_err());
}
