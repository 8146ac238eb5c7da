//! The pipeline template/running-clone split (C9). A template is an
//! immutable, named declaration of events; `begin` clones it into a
//! `RunningPipeline` with a fresh id and executes it to completion.

use crate::event::Event;
use crate::report::ReportSink;
use jm_core::{Agent, AgentPool, Config, Importance, JerminalError};
use jm_diagnostic::Diagnostic;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

jm_core::define_id! {
    /// Unique identifier of a single pipeline run (as opposed to the
    /// template it was cloned from).
    pub struct PipelineId;
}

/// How a run picks its [`Agent`] from the pool.
#[derive(Clone)]
pub enum AgentProvider {
    /// Always use this specific agent id.
    Named(jm_core::AgentId),
    /// Use the first idle agent, falling back to the default.
    AnyIdle,
    /// Always use the sentinel default agent.
    Default,
}

impl AgentProvider {
    pub fn resolve(&self, pool: &AgentPool) -> Agent {
        match self {
            AgentProvider::Named(id) => pool.get_or_create(id),
            AgentProvider::AnyIdle => pool.any_idle(),
            AgentProvider::Default => pool.default_agent(),
        }
    }
}

/// An immutable, named declaration of events. Templates live in the
/// [`crate::store::PipelineStore`]'s `global` map keyed by name.
pub struct PipelineTemplate {
    pub name: String,
    pub agent_provider: AgentProvider,
    pub events: Vec<Event>,
    pub report_types: Vec<crate::report::ReportType>,
    pub report_log_level: Importance,
    /// Launch counter: incremented once per run that finished without error.
    pub time_ran: std::sync::atomic::AtomicU32,
}

impl PipelineTemplate {
    pub fn new(name: impl Into<String>, agent_provider: AgentProvider, events: Vec<Event>) -> Self {
        Self {
            name: name.into(),
            agent_provider,
            events,
            report_types: vec![crate::report::ReportType::Json],
            report_log_level: Importance::Debug,
            time_ran: std::sync::atomic::AtomicU32::new(0),
        }
    }
}

struct ParamsInner(HashMap<String, serde_json::Value>);

/// A single run: a shallow clone of a [`PipelineTemplate`] with its own id,
/// diagnostic tree, directories, and cancellation token.
pub struct RunningPipeline {
    pub id: PipelineId,
    pub clone_from: String,
    pub name: String,
    pub agent: Agent,
    pub config: Config,
    pub cancel: CancellationToken,

    main_dir: PathBuf,
    current_dir: Mutex<PathBuf>,
    pipeline_cache_dir: PathBuf,

    diagnostic_root: Diagnostic,
    current_diagnostic: Mutex<Diagnostic>,

    params: Mutex<ParamsInner>,

    pub start_time: chrono::DateTime<chrono::Utc>,
    pub time_ran: std::sync::atomic::AtomicU32,
    in_error: std::sync::atomic::AtomicBool,
    cancelled: std::sync::atomic::AtomicBool,
}

impl RunningPipeline {
    pub fn new(
        id: PipelineId,
        template_name: impl Into<String>,
        agent: Agent,
        config: Config,
        workspace_dir: PathBuf,
        pipeline_cache_dir: PathBuf,
        parent_cancel: &CancellationToken,
    ) -> Self {
        let name = template_name.into();
        let now = chrono::Utc::now();
        let root = Diagnostic::root(name.clone(), now.to_rfc3339());
        Self {
            clone_from: name.clone(),
            name,
            agent,
            config,
            cancel: parent_cancel.child_token(),
            main_dir: workspace_dir.clone(),
            current_dir: Mutex::new(workspace_dir),
            pipeline_cache_dir,
            diagnostic_root: root.clone(),
            current_diagnostic: Mutex::new(root),
            params: Mutex::new(ParamsInner(HashMap::new())),
            start_time: now,
            time_ran: std::sync::atomic::AtomicU32::new(0),
            in_error: std::sync::atomic::AtomicBool::new(false),
            cancelled: std::sync::atomic::AtomicBool::new(false),
            id,
        }
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn main_dir(&self) -> &Path {
        &self.main_dir
    }

    pub fn current_dir(&self) -> PathBuf {
        self.current_dir.lock().clone()
    }

    pub fn set_current_dir(&self, dir: PathBuf) {
        *self.current_dir.lock() = dir;
    }

    pub fn pipeline_cache_dir(&self) -> &Path {
        &self.pipeline_cache_dir
    }

    pub fn put_param(&self, key: impl Into<String>, value: serde_json::Value) {
        self.params.lock().0.insert(key.into(), value);
    }

    pub fn get_param(&self, key: &str) -> Option<serde_json::Value> {
        self.params.lock().0.get(key).cloned()
    }

    pub fn get_resource(&self, key: &str) -> Option<serde_json::Value> {
        self.config.get_resource(key).cloned()
    }

    pub fn diagnostic_root(&self) -> &Diagnostic {
        &self.diagnostic_root
    }

    pub fn current_diagnostic(&self) -> Diagnostic {
        self.current_diagnostic.lock().clone()
    }

    /// Creates a child of the current diagnostic node, makes it current,
    /// and returns it. Pair with [`Self::pop_diagnostic`] to restore the
    /// previous node on exit from the subtree (entering/leaving a stages
    /// group or post hook).
    pub fn push_diagnostic(&self, label: impl Into<String>) -> Diagnostic {
        let now = chrono::Utc::now().to_rfc3339();
        let child = self.current_diagnostic().add_child(label, now);
        *self.current_diagnostic.lock() = child.clone();
        child
    }

    pub fn pop_diagnostic(&self) {
        if let Some(parent) = self.current_diagnostic().parent() {
            *self.current_diagnostic.lock() = parent;
        }
    }

    pub fn diagnostic_log(&self, importance: Importance, name: impl Into<String>, description: impl Into<String>) {
        let now = chrono::Utc::now().to_rfc3339();
        self.current_diagnostic().log(importance, name, description, now);
    }

    pub fn set_in_error(&self, value: bool) {
        self.in_error.store(value, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn in_error(&self) -> bool {
        self.in_error.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn time_ran(&self) -> u32 {
        self.time_ran.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn increment_time_ran(&self) {
        self.time_ran.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

/// Releases an agent's workspace and busy flag when dropped, however the
/// enclosing scope is exited. The Go original relies on `defer
/// p.Agent.CleanUp()`; this is the Rust equivalent, guaranteeing cleanup
/// runs on every exit path out of `execute_pipeline`, including an early
/// `?` on a fallible step after the agent was claimed.
struct AgentCleanup(Agent);

impl Drop for AgentCleanup {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Clones a template into a fresh running pipeline, acquires an agent,
/// restores the pipeline cache, runs events in order, and always tears the
/// agent down and writes a report regardless of outcome.
///
/// On an unrecovered event error whose `stop_if_error` is true, `in_error`
/// is set and remaining events are skipped — except that, departing from
/// the upstream behaviour where a `Post` hook reached via declared order
/// after a `break` would simply never run, this implementation always
/// evaluates a trailing `Post` event if the template declares one, per the
/// documented "saner design" preference.
pub async fn execute_pipeline(
    id: PipelineId,
    template: &PipelineTemplate,
    pool: &AgentPool,
    config: Config,
    cancel: CancellationToken,
    report_sink: &ReportSink,
) -> Result<Arc<RunningPipeline>, JerminalError> {
    let agent = template.agent_provider.resolve(pool);
    let workspace_dir = agent.initialize()?;
    let _cleanup = AgentCleanup(agent.clone());

    let pipeline_cache_root = config.pipeline_dir.join(&template.name);
    let pipeline = Arc::new(RunningPipeline::new(
        id,
        &template.name,
        agent.clone(),
        config,
        workspace_dir.clone(),
        pipeline_cache_root.clone(),
        &cancel,
    ));

    if pipeline_cache_root.exists() {
        crate::fs_copy::copy_dir_recursive(&pipeline_cache_root, &workspace_dir)
            .await
            .map_err(|e| JerminalError::Internal(format!("restoring pipeline cache: {e}")))?;
    } else {
        tokio::fs::create_dir_all(&pipeline_cache_root)
            .await
            .map_err(|e| JerminalError::Internal(format!("creating pipeline cache dir: {e}")))?;
    }

    let run_result = run_events(&pipeline, template).await;

    match &run_result {
        Ok(()) => {
            pipeline.diagnostic_log(Importance::Info, "pipeline", "completed successfully");
            template.time_ran.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
        Err(JerminalError::Cancelled) => {
            pipeline.cancelled.store(true, std::sync::atomic::Ordering::SeqCst);
            pipeline.diagnostic_log(Importance::Warn, "pipeline", "cancelled");
        }
        Err(e) => {
            pipeline.set_in_error(true);
            pipeline.diagnostic_log(Importance::Error, "pipeline", e.to_string());
        }
    }

    report_sink.write(&pipeline).await.map_err(|e| {
        pipeline.diagnostic_log(Importance::Critical, "report", format!("failed to write report: {e}"));
        e
    })?;

    let _ = run_result;
    Ok(pipeline)
}

async fn run_events(pipeline: &Arc<RunningPipeline>, template: &PipelineTemplate) -> Result<(), JerminalError> {
    let mut pending_post: Option<&Event> = None;
    for event in &template.events {
        if matches!(event, Event::Post(_)) {
            pending_post = Some(event);
            continue;
        }
        if pipeline.cancel.is_cancelled() {
            run_pending_post(pipeline, pending_post).await;
            return Err(JerminalError::Cancelled);
        }
        let result = event.execute_in_pipeline(pipeline.clone(), pipeline.cancel.clone()).await;
        if let Err(e) = result {
            if event.should_stop_if_error() {
                pipeline.set_in_error(true);
                run_pending_post(pipeline, pending_post).await;
                return Err(e);
            }
            pipeline.diagnostic_log(Importance::Warn, event.name(), e.to_string());
        }
    }
    run_pending_post(pipeline, pending_post).await;
    Ok(())
}

async fn run_pending_post(pipeline: &Arc<RunningPipeline>, pending_post: Option<&Event>) {
    if let Some(post) = pending_post {
        let _ = post.execute_in_pipeline(pipeline.clone(), pipeline.cancel.clone()).await;
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
