//! Agent pool: mutual exclusion over a fixed set of workspace directories.
//!
//! An agent owns exactly one directory on disk. `initialize` fails if that
//! directory already exists (a previous run did not clean up), and `finish`
//! removes it and wakes the next waiter.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

crate::define_id! {
    /// Identifier of an agent workspace slot.
    pub struct AgentId;
}

/// Sentinel id for the always-present default agent.
pub const DEFAULT_AGENT_ID: &str = "6524a5fc-0772-4684-82d7-6900c444162b";

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent {0} has a dirty workspace: directory already exists from a previous run")]
    DirtyWorkspace(AgentId),
    #[error("io error initializing agent {agent}: {source}")]
    Io {
        agent: AgentId,
        #[source]
        source: std::io::Error,
    },
}

struct AgentSlot {
    id: AgentId,
    busy: Mutex<bool>,
    busy_signal: Condvar,
}

/// A single workspace slot. Clone is cheap: it shares the inner lock.
#[derive(Clone)]
pub struct Agent {
    slot: Arc<AgentSlot>,
    root: PathBuf,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent").field("id", &self.slot.id).finish()
    }
}

impl Agent {
    fn new(id: AgentId, root: PathBuf) -> Self {
        Self {
            slot: Arc::new(AgentSlot {
                id,
                busy: Mutex::new(false),
                busy_signal: Condvar::new(),
            }),
            root,
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.slot.id
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.root.join(self.slot.id.as_str())
    }

    fn is_idle(&self) -> bool {
        !*self.slot.busy.lock()
    }

    /// Blocks until the agent is free, then claims it and creates its
    /// workspace directory. Returns the absolute path the caller should run
    /// in. Errors if the directory already exists: a previous run did not
    /// clean it up.
    pub fn initialize(&self) -> Result<PathBuf, AgentError> {
        {
            let mut busy = self.slot.busy.lock();
            while *busy {
                self.slot.busy_signal.wait(&mut busy);
            }
            *busy = true;
        }
        let dir = self.workspace_dir();
        if dir.exists() {
            let mut busy = self.slot.busy.lock();
            *busy = false;
            self.slot.busy_signal.notify_one();
            return Err(AgentError::DirtyWorkspace(self.slot.id.clone()));
        }
        std::fs::create_dir_all(&dir).map_err(|source| {
            let mut busy = self.slot.busy.lock();
            *busy = false;
            self.slot.busy_signal.notify_one();
            AgentError::Io {
                agent: self.slot.id.clone(),
                source,
            }
        })?;
        Ok(dir)
    }

    /// Removes the workspace directory and frees the agent for the next
    /// waiter. Idempotent: tolerates the directory already being gone.
    pub fn finish(&self) {
        let dir = self.workspace_dir();
        if dir.exists() {
            let _ = std::fs::remove_dir_all(&dir);
        }
        let mut busy = self.slot.busy.lock();
        *busy = false;
        self.slot.busy_signal.notify_one();
    }
}

/// The fixed pool of agents available to run pipelines. Always contains
/// [`DEFAULT_AGENT_ID`], seeded ahead of any configured agents.
pub struct AgentPool {
    agent_root: PathBuf,
    agents: Mutex<HashMap<AgentId, Agent>>,
}

impl AgentPool {
    pub fn new(agent_root: PathBuf) -> Self {
        let pool = Self {
            agent_root,
            agents: Mutex::new(HashMap::new()),
        };
        pool.get_or_create(&AgentId::new(DEFAULT_AGENT_ID));
        pool
    }

    pub fn with_agents(agent_root: PathBuf, ids: impl IntoIterator<Item = AgentId>) -> Self {
        let pool = Self::new(agent_root);
        for id in ids {
            pool.get_or_create(&id);
        }
        pool
    }

    /// Looks up an agent by id, lazily creating its slot if unseen.
    pub fn get_or_create(&self, id: &AgentId) -> Agent {
        let mut agents = self.agents.lock();
        agents
            .entry(id.clone())
            .or_insert_with(|| Agent::new(id.clone(), self.agent_root.clone()))
            .clone()
    }

    pub fn default_agent(&self) -> Agent {
        self.get_or_create(&AgentId::new(DEFAULT_AGENT_ID))
    }

    /// Returns the first idle agent found in a single non-blocking scan, or
    /// the default agent if every agent is currently busy. The returned
    /// agent is not yet claimed: callers must still call `initialize()`,
    /// which may briefly block if another caller won the race. This pool
    /// makes no fairness guarantee across waiters.
    pub fn any_idle(&self) -> Agent {
        let agents = self.agents.lock();
        for agent in agents.values() {
            if agent.is_idle() {
                return agent.clone();
            }
        }
        drop(agents);
        self.default_agent()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
