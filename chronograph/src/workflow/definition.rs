//! `WorkflowDefinition`: parsed form of `workflows/<name>.yaml` (spec §3, §4.2).
//! Immutable for the duration of a run; reloadable out-of-run.

use crate::workflow::catalog::LifecyclePhase;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    Standard,
    Iterative,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTier {
    Fast,
    Standard,
    Premium,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepDefinition {
    pub name: String,
    pub agent_id: String,
    pub action: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub phase: Option<LifecyclePhase>,
    #[serde(default)]
    pub tier: Option<StepTier>,
    #[serde(default)]
    pub substeps: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisualizationEdge {
    pub from: String,
    pub to: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_max_concurrent_steps")]
    pub max_concurrent_steps: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub quality_validation: bool,
}

fn default_max_concurrent_steps() -> u32 {
    3
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            max_concurrent_steps: default_max_concurrent_steps(),
            timeout_seconds: default_timeout_seconds(),
            quality_validation: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
    #[serde(default)]
    pub global_config: GlobalConfig,
    pub steps: Vec<StepDefinition>,
    #[serde(default)]
    pub visualization_edges: Vec<VisualizationEdge>,
}

impl WorkflowDefinition {
    pub fn step(&self, name: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }
}
