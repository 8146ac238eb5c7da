//! Shared fixtures for this crate's own test modules.

use crate::pipeline::{PipelineId, RunningPipeline};
use jm_core::{Agent, AgentPool, Config};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds a `RunningPipeline` rooted in a fresh temp directory, paired with
/// the `TempDir` guard (drop order: return it alongside so it outlives the
/// pipeline in the caller's scope).
pub fn test_pipeline() -> (Arc<RunningPipeline>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let pool = AgentPool::new(tmp.path().join("agents"));
    let agent: Agent = pool.default_agent();
    let workspace = agent.initialize().unwrap_or_else(|e| panic!("agent init: {e}"));

    let config = Config {
        agent_dir: tmp.path().join("agents"),
        pipeline_dir: tmp.path().join("pipeline"),
        report_dir: tmp.path().join("reports"),
        ..Default::default()
    };

    let pipeline = RunningPipeline::new(
        PipelineId::new("test-run"),
        "test-pipeline",
        agent,
        config,
        workspace.clone(),
        tmp.path().join("pipeline/test-pipeline"),
        &CancellationToken::new(),
    );
    (Arc::new(pipeline), tmp)
}
