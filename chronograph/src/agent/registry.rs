//! Agent id registry: dynamic dispatch over heterogeneous agents modeled as a tagged
//! variant on agent id (spec §9), so the orchestrator never holds a pointer to a
//! concrete agent's internal state.

use super::ExecutableAgent;
use std::collections::HashMap;
use std::sync::Arc;

/// A stable identifier naming a registered agent (e.g. `"semantic_analyzer"`).
pub type AgentId = String;

/// Maps agent ids to their executable handle. Agents are looked up by id at
/// scheduling time; the orchestrator never holds a typed reference to one.
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, Arc<dyn ExecutableAgent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<AgentId>, agent: Arc<dyn ExecutableAgent>) {
        self.agents.insert(id.into(), agent);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ExecutableAgent>> {
        self.agents.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentContext, LegacyAdapter};

    #[test]
    fn register_and_lookup_by_id() {
        let mut registry = AgentRegistry::new();
        let adapter = LegacyAdapter::new("demo", |input| Box::pin(async move { Ok(input) }));
        registry.register("demo", Arc::new(adapter));
        assert!(registry.contains("demo"));
        assert!(registry.get("demo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn registered_agent_executes() {
        let mut registry = AgentRegistry::new();
        let adapter = LegacyAdapter::new("demo", |input| Box::pin(async move { Ok(input) }));
        registry.register("demo", Arc::new(adapter));
        let agent = registry.get("demo").unwrap();
        let response = agent
            .execute(serde_json::json!(1), &AgentContext::default(), "step")
            .await;
        assert!(response.is_success());
    }
}
