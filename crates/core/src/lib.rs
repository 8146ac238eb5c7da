//! jm-core: domain primitives shared by the rest of the workspace — agent
//! pool, config snapshot, severity levels, and the common error taxonomy.

pub mod agent;
pub mod config;
pub mod error;
pub mod id;
pub mod importance;

pub use agent::{Agent, AgentError, AgentId, AgentPool, DEFAULT_AGENT_ID};
pub use config::{Config, ConfigStore};
pub use error::JerminalError;
pub use id::{IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use importance::Importance;
