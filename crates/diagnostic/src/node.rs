use crate::event::DiagnosticEvent;
use jm_core::Importance;
use parking_lot::Mutex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One entry in a diagnostic node's event list: either a leaf log line or a
/// nested subtree (a child diagnostic, e.g. a stage or stages-group).
#[derive(Clone)]
pub enum Log {
    Event(DiagnosticEvent),
    Node(Diagnostic),
}

struct Inner {
    label: String,
    start_time: String,
    in_error: Mutex<bool>,
    events: Mutex<Vec<Log>>,
    parent: Option<Diagnostic>,
}

/// A tree node in the diagnostic tree. Cheap to clone: clones share the same
/// underlying node, so a handle can be passed into a spawned task and still
/// append to the same log.
#[derive(Clone)]
pub struct Diagnostic(Arc<Inner>);

impl Diagnostic {
    pub fn root(label: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self(Arc::new(Inner {
            label: label.into(),
            start_time: start_time.into(),
            in_error: Mutex::new(false),
            events: Mutex::new(Vec::new()),
            parent: None,
        }))
    }

    /// Creates a child node, appends it to this node's event list, and
    /// returns it. The child remembers this node as its parent so callers
    /// can reset their "current" pointer back to it when leaving the
    /// subtree.
    pub fn add_child(&self, label: impl Into<String>, start_time: impl Into<String>) -> Diagnostic {
        let child = Diagnostic(Arc::new(Inner {
            label: label.into(),
            start_time: start_time.into(),
            in_error: Mutex::new(false),
            events: Mutex::new(Vec::new()),
            parent: Some(self.clone()),
        }));
        self.0.events.lock().push(Log::Node(child.clone()));
        child
    }

    pub fn parent(&self) -> Option<Diagnostic> {
        self.0.parent.clone()
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    pub fn log(
        &self,
        importance: Importance,
        name: impl Into<String>,
        description: impl Into<String>,
        time: impl Into<String>,
    ) {
        self.0
            .events
            .lock()
            .push(Log::Event(DiagnosticEvent::new(importance, name, description, time)));
    }

    pub fn set_in_error(&self, value: bool) {
        *self.0.in_error.lock() = value;
    }

    pub fn in_error(&self) -> bool {
        *self.0.in_error.lock()
    }

    /// Deep-clones the subtree, dropping any leaf event below `threshold`.
    /// Child nodes are always kept (they are structural, not log severity),
    /// but their own events are filtered recursively.
    pub fn filter_based_on_importance(&self, threshold: Importance) -> Diagnostic {
        self.filter_with_parent(threshold, self.0.parent.clone())
    }

    fn filter_with_parent(&self, threshold: Importance, parent: Option<Diagnostic>) -> Diagnostic {
        let filtered = Diagnostic(Arc::new(Inner {
            label: self.0.label.clone(),
            start_time: self.0.start_time.clone(),
            in_error: Mutex::new(*self.0.in_error.lock()),
            events: Mutex::new(Vec::new()),
            parent,
        }));
        let mut kept = Vec::new();
        for entry in self.0.events.lock().iter() {
            match entry {
                Log::Event(e) if e.importance >= threshold => kept.push(Log::Event(e.clone())),
                Log::Event(_) => {}
                Log::Node(child) => {
                    kept.push(Log::Node(child.filter_with_parent(threshold, Some(filtered.clone()))));
                }
            }
        }
        *filtered.0.events.lock() = kept;
        filtered
    }
}

impl Serialize for Diagnostic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Diagnostic", 4)?;
        s.serialize_field("label", &self.0.label)?;
        s.serialize_field("start_time", &self.0.start_time)?;
        s.serialize_field("in_error", &*self.0.in_error.lock())?;
        s.serialize_field("events", &LogList(&self.0.events.lock()))?;
        s.end()
    }
}

struct LogList<'a>(&'a [Log]);

impl Serialize for LogList<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for entry in self.0 {
            seq.serialize_element(&LogWrapper(entry))?;
        }
        seq.end()
    }
}

struct LogWrapper<'a>(&'a Log);

impl Serialize for LogWrapper<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("LogWrapper", 2)?;
        match self.0 {
            Log::Event(e) => {
                s.serialize_field("type", "diagnostic_event")?;
                s.serialize_field("data", e)?;
            }
            Log::Node(d) => {
                s.serialize_field("type", "diagnostic")?;
                s.serialize_field("data", d)?;
            }
        }
        s.end()
    }
}

/// Decodes a tagged-union diagnostic tree produced by `serde_json::to_value`
/// on a [`Diagnostic`]. A free function rather than a `Deserialize` impl
/// because child nodes need their freshly-built parent wired in as they are
/// constructed, which `Deserialize` alone can't express.
pub fn from_value(value: &serde_json::Value) -> Result<Diagnostic, DecodeError> {
    build(value, None)
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unknown log wrapper type `{0}`")]
    UnknownType(String),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

fn build(value: &serde_json::Value, parent: Option<Diagnostic>) -> Result<Diagnostic, DecodeError> {
    let label = value
        .get("label")
        .and_then(|v| v.as_str())
        .ok_or(DecodeError::MissingField("label"))?
        .to_string();
    let start_time = value
        .get("start_time")
        .and_then(|v| v.as_str())
        .ok_or(DecodeError::MissingField("start_time"))?
        .to_string();
    let in_error = value.get("in_error").and_then(|v| v.as_bool()).unwrap_or(false);
    let node = Diagnostic(Arc::new(Inner {
        label,
        start_time,
        in_error: Mutex::new(in_error),
        events: Mutex::new(Vec::new()),
        parent,
    }));

    let events = value
        .get("events")
        .and_then(|v| v.as_array())
        .ok_or(DecodeError::MissingField("events"))?;
    let mut built = Vec::with_capacity(events.len());
    for wrapper in events {
        let ty = wrapper
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(DecodeError::MissingField("type"))?;
        let data = wrapper.get("data").ok_or(DecodeError::MissingField("data"))?;
        match ty {
            "diagnostic_event" => {
                let event: DiagnosticEvent = serde_json::from_value(data.clone())?;
                built.push(Log::Event(event));
            }
            "diagnostic" => {
                let child = build(data, Some(node.clone()))?;
                built.push(Log::Node(child));
            }
            other => return Err(DecodeError::UnknownType(other.to_string())),
        }
    }
    *node.0.events.lock() = built;
    Ok(node)
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
