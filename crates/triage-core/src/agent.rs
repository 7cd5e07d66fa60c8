//! Agent contract and registry
//!
//! Agents are external collaborators: the core only sees the [`Agent`]
//! trait. A response always comes back; failures are encoded in
//! [`AgentResponse::status`], never returned as errors.

use crate::types::{AgentResponse, IntentProfile};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Agent invoked by the orchestrator
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Stable registry identifier
    fn id(&self) -> &str;

    /// Human-readable name used in events and reports
    fn display_name(&self) -> &str;

    /// Produce findings for the request
    async fn invoke(&self, text: &str, profile: Option<&IntentProfile>) -> AgentResponse;
}

/// Lookup table of agents keyed by id
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under its own id, replacing any previous entry
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> Option<Arc<dyn Agent>> {
        self.agents.insert(agent.id().to_string(), agent)
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, agent: Arc<dyn Agent>) -> Self {
        self.register(agent);
        self
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.get(id)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Registered ids, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.ids())
            .finish()
    }
}
