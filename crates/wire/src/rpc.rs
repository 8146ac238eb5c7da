//! JSON-RPC 2.0 request/response shapes exchanged between `jerminal` (the
//! CLI client) and `jermd` (the daemon) over a [`crate::framing`]-framed
//! Unix socket connection.

use jm_diagnostic::Importance;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorData {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorData {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// A response is either a result keyed to the request id, or an error. `id`
/// is `None` on an error detected before the request id could be parsed
/// (e.g. a parse error on malformed JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorData>,
}

impl Response {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<u64>, error: ErrorData) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// `launch-pipeline` request params: the template name to clone and run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchPipelineParams {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchPipelineResult {
    pub pipeline_id: String,
}

/// `cancel-pipeline` request params. `secret` must match the daemon's
/// configured `Config::secret`, guarding the otherwise-unauthenticated local
/// socket against an unrelated local process issuing cancellations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelPipelineParams {
    pub pipeline_id: String,
    pub secret: String,
}

/// `list-pipelines` request params: an empty object is valid and lists
/// everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPipelinesParams {
    /// Restrict the result to currently running pipelines.
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePipeline {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPipelinesResult {
    pub templates: Vec<String>,
    pub active: Vec<ActivePipeline>,
}

/// `get-reports` request params. `fields`/`omitted_fields` let a client
/// request a sparse projection of a report without transferring the whole
/// diagnostic tree (see jm-daemon's streaming field filter).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetReportsParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_importance: Option<Importance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omitted_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReportsResult {
    pub reports: Vec<Value>,
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
