//! Leaf units of work. Built-ins: [`Inline`], [`Sh`], [`Cd`], [`Cache`].
//!
//! `execute` takes the running pipeline and cancellation token by `Arc`
//! rather than by reference: executables are stored behind `Arc<dyn
//! Executable>` and may be invoked from spawned tasks (parallel stages),
//! where a borrowed reference would not outlive the task.

use crate::pipeline::RunningPipeline;
use async_trait::async_trait;
use jm_core::{Importance, JerminalError};
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Executable: Send + Sync {
    async fn execute(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError>;
}

/// Key under which [`Sh`] stores captured combined stdout+stderr in the
/// pipeline's params map.
pub const CMD_OUT_KEY: &str = "CmdOutKey";

/// Wraps a user-supplied async closure as an [`Executable`].
pub struct Inline<F> {
    f: Arc<F>,
}

impl<F> Inline<F> {
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F, Fut> Executable for Inline<F>
where
    F: Fn(Arc<RunningPipeline>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), JerminalError>> + Send,
{
    async fn execute(
        &self,
        pipeline: Arc<RunningPipeline>,
        cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        (self.f)(pipeline, cancel).await
    }
}

/// Spawns a shell command with `cwd` set to the pipeline's current
/// directory, captures combined stdout+stderr, and logs it at DEBUG into
/// the pipeline's current diagnostic node.
pub struct Sh {
    pub name: String,
    pub args: Vec<String>,
}

impl Sh {
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Executable for Sh {
    async fn execute(
        &self,
        pipeline: Arc<RunningPipeline>,
        _cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        let cwd = pipeline.current_dir();
        let output = tokio::process::Command::new(&self.name)
            .args(&self.args)
            .current_dir(&cwd)
            .output()
            .await
            .map_err(|e| JerminalError::Executable(format!("spawning `{}`: {e}", self.name)))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        pipeline.put_param(CMD_OUT_KEY, serde_json::Value::String(combined.clone()));
        pipeline.diagnostic_log(
            Importance::Debug,
            "sh",
            format!("`{} {}` -> {:?}\n{}", self.name, self.args.join(" "), output.status, combined),
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(JerminalError::Executable(format!(
                "`{}` exited with {}",
                self.name, output.status
            )))
        }
    }
}

/// Changes the pipeline's current directory, rejecting absolute paths and
/// any path that escapes `main_dir` via `..`.
pub struct Cd {
    pub rel: PathBuf,
}

impl Cd {
    pub fn new(rel: impl Into<PathBuf>) -> Self {
        Self { rel: rel.into() }
    }
}

fn rejects_escape(rel: &Path) -> bool {
    rel.is_absolute()
        || rel
            .components()
            .any(|c| matches!(c, Component::ParentDir))
}

#[async_trait]
impl Executable for Cd {
    async fn execute(
        &self,
        pipeline: Arc<RunningPipeline>,
        _cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        if rejects_escape(&self.rel) {
            return Err(JerminalError::Navigation(format!(
                "rejected path `{}`: absolute or escaping",
                self.rel.display()
            )));
        }
        let target = pipeline.current_dir().join(&self.rel);
        let metadata = tokio::fs::metadata(&target)
            .await
            .map_err(|e| JerminalError::Navigation(format!("`{}`: {e}", target.display())))?;
        if !metadata.is_dir() {
            return Err(JerminalError::Navigation(format!(
                "`{}` is not a directory",
                target.display()
            )));
        }
        pipeline.set_current_dir(target);
        Ok(())
    }
}

/// A deferred executable that resets `current_dir` back to `main_dir`.
/// Pair with [`Cd`] via an [`crate::executor::Executor`] so the reset always
/// runs, matching the upstream `CD` contract.
pub struct ResetDir;

#[async_trait]
impl Executable for ResetDir {
    async fn execute(
        &self,
        pipeline: Arc<RunningPipeline>,
        _cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        let main_dir = pipeline.main_dir().to_path_buf();
        pipeline.set_current_dir(main_dir);
        Ok(())
    }
}

/// Copies `<current_dir>/<dir>` into `<pipeline_cache_dir>/<dir>`, creating
/// the destination if absent. Idempotent: always replaces the whole tree.
pub struct Cache {
    pub dir: String,
}

impl Cache {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Executable for Cache {
    async fn execute(
        &self,
        pipeline: Arc<RunningPipeline>,
        _cancel: CancellationToken,
    ) -> Result<(), JerminalError> {
        let src = pipeline.current_dir().join(&self.dir);
        let dst = pipeline.pipeline_cache_dir().join(&self.dir);
        crate::fs_copy::copy_dir_recursive(&src, &dst)
            .await
            .map_err(|e| JerminalError::Internal(format!("caching `{}`: {e}", self.dir)))
    }
}

#[cfg(test)]
#[path = "executable_tests.rs"]
mod tests;
