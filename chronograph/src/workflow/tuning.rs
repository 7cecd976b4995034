//! Tuning configuration: orchestrator thresholds, heartbeat interval, mock delays,
//! per-agent knobs (spec §4.2, §6). Read through the same loader and cached until
//! an explicit cache clear.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OrchestratorTuning {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_threshold")]
    pub retry_threshold: f64,
    #[serde(default = "default_skip_threshold")]
    pub skip_threshold: f64,
    #[serde(default = "default_use_llm_routing")]
    pub use_llm_routing: bool,
    #[serde(default = "default_max_concurrent_steps")]
    pub max_concurrent_steps: u32,
    #[serde(default = "default_step_timeout_seconds")]
    pub default_step_timeout_seconds: u64,
}

fn default_max_retries() -> u32 {
    3
}
fn default_retry_threshold() -> f64 {
    0.5
}
fn default_skip_threshold() -> f64 {
    0.3
}
fn default_use_llm_routing() -> bool {
    true
}
fn default_max_concurrent_steps() -> u32 {
    3
}
fn default_step_timeout_seconds() -> u64 {
    120
}

impl Default for OrchestratorTuning {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_threshold: default_retry_threshold(),
            skip_threshold: default_skip_threshold(),
            use_llm_routing: default_use_llm_routing(),
            max_concurrent_steps: default_max_concurrent_steps(),
            default_step_timeout_seconds: default_step_timeout_seconds(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WorkflowRunnerTuning {
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    #[serde(default)]
    pub mock_llm_delay_ms: Option<u64>,
}

fn default_heartbeat_interval_ms() -> u64 {
    5_000
}

impl Default for WorkflowRunnerTuning {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            mock_llm_delay_ms: None,
        }
    }
}

/// Open-ended per-agent knobs (spec §9: operator sub-statuses and similar knobs are
/// documented but not strictly typed; implementations expose them as an open map).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentTuning(pub HashMap<String, serde_json::Value>);

impl AgentTuning {
    pub fn get(&self, agent_id: &str) -> Option<&serde_json::Value> {
        self.0.get(agent_id)
    }
}
