use jm_core::Importance;
use serde::{Deserialize, Serialize};

/// A single leaf log line attached to a diagnostic node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    pub importance: Importance,
    pub description: String,
    /// RFC 3339 timestamp, formatted by the caller so this crate stays
    /// independent of a particular clock/time library choice.
    pub time: String,
    pub name: String,
}

impl DiagnosticEvent {
    pub fn new(
        importance: Importance,
        name: impl Into<String>,
        description: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            importance,
            description: description.into(),
            time: time.into(),
            name: name.into(),
        }
    }
}
