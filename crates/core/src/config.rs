//! Config snapshot: loads `resources/jerminal.json`, expands `$VAR`
//! references recursively across every string reachable from the root
//! (including inside `user_params` maps and arrays), and hands pipelines an
//! immutable clone taken at the instant they start.

use crate::error::JerminalError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(rename = "agent-dir")]
    pub agent_dir: PathBuf,
    #[serde(rename = "pipeline-dir")]
    pub pipeline_dir: PathBuf,
    #[serde(rename = "report-dir")]
    pub report_dir: PathBuf,
    #[serde(rename = "github-webhook-secret", default)]
    pub github_webhook_secret: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub project: String,
    #[serde(rename = "user-params", default)]
    pub user_params: HashMap<String, Value>,
}

impl Config {
    pub fn get_resource(&self, key: &str) -> Option<&Value> {
        self.user_params.get(key)
    }
}

/// Thread-safe holder for the live config; pipelines retain a cloned
/// snapshot rather than a reference so later reloads never affect a run in
/// progress.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<Config>>,
}

impl ConfigStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, JerminalError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| JerminalError::Config(format!("reading {}: {e}", path.as_ref().display())))?;
        let mut value: Value = serde_json::from_str(&raw)
            .map_err(|e| JerminalError::Config(format!("parsing {}: {e}", path.as_ref().display())))?;
        expand_env_in_value(&mut value);
        let config: Config = serde_json::from_value(value)
            .map_err(|e| JerminalError::Config(format!("shape of {}: {e}", path.as_ref().display())))?;
        Ok(Self {
            inner: Arc::new(RwLock::new(config)),
        })
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns an owned copy, independent of future reloads.
    pub fn snapshot(&self) -> Config {
        self.inner.read().clone()
    }

    pub fn reload(&self, config: Config) {
        *self.inner.write() = config;
    }

    /// Creates `<base>/agent` and `<base>/pipeline` if missing, and writes a
    /// default `resources/jerminal.json` if none exists yet. Never reads
    /// from stdin; callers in non-interactive contexts pass the webhook
    /// secret and passphrase in directly.
    pub fn bootstrap(base_dir: &Path, secret: &str) -> Result<PathBuf, JerminalError> {
        std::fs::create_dir_all(base_dir.join("agent"))?;
        std::fs::create_dir_all(base_dir.join("pipeline"))?;
        std::fs::create_dir_all(base_dir.join("resources"))?;
        let config_path = base_dir.join("resources/jerminal.json");
        if !config_path.exists() {
            let default = Config {
                agent_dir: base_dir.join("agent"),
                pipeline_dir: base_dir.join("pipeline"),
                report_dir: base_dir.join("reports"),
                github_webhook_secret: String::new(),
                secret: secret.to_string(),
                project: String::new(),
                user_params: HashMap::new(),
            };
            let text = serde_json::to_string_pretty(&default)?;
            std::fs::write(&config_path, text)?;
        }
        Ok(config_path)
    }
}

fn expand_env_in_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            *s = expand_env_string(s);
        }
        Value::Array(items) => {
            for item in items {
                expand_env_in_value(item);
            }
        }
        Value::Object(map) => {
            for v in map.values_mut() {
                expand_env_in_value(v);
            }
        }
        _ => {}
    }
}

/// Expands `$NAME` references in `input`, leaving unknown variables
/// untouched (as the literal `$NAME` text) rather than erroring.
fn expand_env_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            out.push('$');
        } else {
            match std::env::var(&name) {
                Ok(value) => out.push_str(&value),
                Err(_) => {
                    out.push('$');
                    out.push_str(&name);
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
