//! Agent catalog: agent metadata shared by the orchestrator and the dashboard
//! (spec §4.2).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Initialization,
    Batch,
    Finalization,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentCatalogEntry {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uses_llm: bool,
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub lifecycle_phase: Option<LifecyclePhase>,
    #[serde(default)]
    pub row: Option<u32>,
    #[serde(default)]
    pub col: Option<u32>,
}

/// Parsed form of `agents.yaml`: the orchestrator node, the catalog of concrete
/// agents, and the step-name-to-agent-id mapping the dashboard uses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentCatalog {
    pub orchestrator_node: AgentCatalogEntry,
    pub agents: Vec<AgentCatalogEntry>,
    #[serde(default)]
    pub step_mappings: HashMap<String, String>,
}

impl AgentCatalog {
    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.id.as_str())
    }

    pub fn contains_agent_id(&self, id: &str) -> bool {
        id == self.orchestrator_node.id || self.agents.iter().any(|a| a.id == id)
    }
}
