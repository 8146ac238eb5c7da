//! Pipeline store (C10): holds the named templates loaded at startup and
//! tracks runs currently in flight so they can be listed or cancelled.

use crate::pipeline::{execute_pipeline, PipelineId, PipelineTemplate};
use crate::report::ReportSink;
use jm_core::{AgentPool, Config, JerminalError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct Active {
    name: String,
    cancel: CancellationToken,
}

/// Owns the pool of named templates and the set of in-flight runs. Cheap to
/// clone: every field is behind an `Arc`, so the daemon can hand a copy to
/// each connection handler.
#[derive(Clone)]
pub struct PipelineStore {
    global: Arc<Mutex<HashMap<String, Arc<PipelineTemplate>>>>,
    active: Arc<Mutex<HashMap<PipelineId, Active>>>,
    pool: Arc<AgentPool>,
    config: Config,
    root_cancel: CancellationToken,
}

impl PipelineStore {
    pub fn new(pool: Arc<AgentPool>, config: Config) -> Self {
        Self {
            global: Arc::new(Mutex::new(HashMap::new())),
            active: Arc::new(Mutex::new(HashMap::new())),
            pool,
            config,
            root_cancel: CancellationToken::new(),
        }
    }

    /// Replaces the entire set of known templates, e.g. after a config file
    /// reload. Runs already in flight keep executing against the template
    /// they were cloned from.
    pub fn set_pipelines(&self, templates: Vec<PipelineTemplate>) {
        let mut global = self.global.lock();
        global.clear();
        for template in templates {
            global.insert(template.name.clone(), Arc::new(template));
        }
    }

    pub fn template_names(&self) -> Vec<String> {
        self.global.lock().keys().cloned().collect()
    }

    pub fn report_dir(&self) -> &std::path::Path {
        &self.config.report_dir
    }

    /// Names and ids of runs currently tracked as in flight.
    pub fn active(&self) -> Vec<(PipelineId, String)> {
        self.active.lock().iter().map(|(id, a)| (id.clone(), a.name.clone())).collect()
    }

    /// Looks up `name`, spawns its execution on the tokio runtime, and
    /// registers it as active for the duration of the run. Returns the new
    /// run's id immediately; callers observe completion via `list`/`reports`
    /// or by awaiting the returned `JoinHandle` themselves.
    pub fn begin_pipeline(&self, name: &str) -> Result<(PipelineId, tokio::task::JoinHandle<()>), JerminalError> {
        let template = self
            .global
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| JerminalError::NotFound(format!("no pipeline named `{name}`")))?;

        let id = PipelineId::new(uuid::Uuid::new_v4().to_string());
        let cancel = self.root_cancel.child_token();
        let pool = self.pool.clone();
        let config = self.config.clone();
        let report_sink = ReportSink::new(
            self.config.report_dir.clone(),
            template.report_types.clone(),
            template.report_log_level,
        );

        self.active.lock().insert(
            id.clone(),
            Active {
                name: name.to_string(),
                cancel: cancel.clone(),
            },
        );

        let store = self.clone();
        let spawn_id = id.clone();
        let handle = tokio::spawn(async move {
            let result = execute_pipeline(spawn_id.clone(), &template, &pool, config, cancel, &report_sink).await;
            if let Err(e) = result {
                tracing::warn!(pipeline = %spawn_id, error = %e, "pipeline run ended in error");
            }
            store.active.lock().remove(&spawn_id);
        });

        Ok((id, handle))
    }

    /// Cancels an in-flight run by id, after checking `secret` against the
    /// daemon's configured `Config::secret`. Returns `NotFound` if no such
    /// run is active (either it never existed or has already finished).
    pub fn cancel_pipeline(&self, id: &PipelineId, secret: &str) -> Result<(), JerminalError> {
        if secret != self.config.secret {
            return Err(JerminalError::Unauthorized("invalid pipeline lifetime secret".into()));
        }
        let active = self.active.lock();
        let entry = active
            .get(id)
            .ok_or_else(|| JerminalError::NotFound(format!("no active pipeline `{id}`")))?;
        entry.cancel.cancel();
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
