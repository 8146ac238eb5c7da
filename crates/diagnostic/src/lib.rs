//! jm-diagnostic: the hierarchical, time-stamped, importance-tagged log tree
//! attached to a pipeline run. Every stage, stages-group, and post hook owns
//! a node; parallel stages append to the same node under its mutex.

mod event;
mod node;

pub use event::DiagnosticEvent;
pub use jm_core::Importance;
pub use node::{from_value, DecodeError, Diagnostic, Log};
