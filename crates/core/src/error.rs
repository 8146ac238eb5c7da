//! The shared error taxonomy, reused (via `#[from]`) across every crate in
//! the workspace so RPC handlers and report writers can map a single enum
//! onto JSON-RPC error codes without inventing a parallel hierarchy per
//! layer.

use crate::agent::AgentError;

#[derive(Debug, thiserror::Error)]
pub enum JerminalError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    DirtyWorkspace(#[from] AgentError),

    #[error("pipeline run was cancelled")]
    Cancelled,

    #[error("executable failed: {0}")]
    Executable(String),

    #[error("navigation rejected: {0}")]
    Navigation(String),

    #[error("failed to decode message: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for JerminalError {
    fn from(e: std::io::Error) -> Self {
        JerminalError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for JerminalError {
    fn from(e: serde_json::Error) -> Self {
        JerminalError::Decode(e.to_string())
    }
}
