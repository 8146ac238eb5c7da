//! Thin client over the `jermd` control socket: frame a JSON-RPC request,
//! send it, read back one framed response.

use jm_wire::{ErrorData, Request};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UnixStream;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to jermd at {path}: {source} (is the daemon running?)")]
    Connect { path: PathBuf, source: std::io::Error },
    #[error("timed out waiting for a response from jermd")]
    Timeout,
    #[error(transparent)]
    Framing(#[from] jm_wire::FramingError),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("jermd rejected the request: {message} (code {code})")]
    Rpc { code: i32, message: String },
}

impl From<ErrorData> for ClientError {
    fn from(e: ErrorData) -> Self {
        ClientError::Rpc {
            code: e.code,
            message: e.message,
        }
    }
}

pub struct DaemonClient {
    socket_path: PathBuf,
    request_timeout: Duration,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            request_timeout: request_timeout(),
        }
    }

    pub async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ClientError::Connect {
                path: self.socket_path.clone(),
                source,
            })?;

        let request = Request::new(1, method, params);
        let encoded = serde_json::to_vec(&request)?;
        timeout(self.request_timeout, jm_wire::write_message(&mut stream, &encoded))
            .await
            .map_err(|_| ClientError::Timeout)??;

        let payload = timeout(self.request_timeout, jm_wire::read_message(&mut stream))
            .await
            .map_err(|_| ClientError::Timeout)??;
        let response: jm_wire::Response = serde_json::from_slice(&payload)?;

        match (response.result, response.error) {
            (Some(value), _) => Ok(value),
            (None, Some(error)) => Err(error.into()),
            (None, None) => Ok(serde_json::Value::Null),
        }
    }
}

fn request_timeout() -> Duration {
    std::env::var("JERMINAL_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
