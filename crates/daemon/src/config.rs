//! Daemon-local environment resolution: where the process keeps its state
//! directory and where it binds its control socket.

use std::path::PathBuf;

/// Resolve the base directory the daemon bootstraps `agent/`, `pipeline/`,
/// and `resources/` under. `JERMINAL_BASE_DIR` overrides the `~/.jerminal`
/// default.
pub fn base_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("JERMINAL_BASE_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".jerminal")
}

/// Resolve the control socket path. `JERMINAL_SOCKET_PATH` overrides the
/// `/tmp/pipeline-control.sock` default.
pub fn socket_path() -> PathBuf {
    std::env::var("JERMINAL_SOCKET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/pipeline-control.sock"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
