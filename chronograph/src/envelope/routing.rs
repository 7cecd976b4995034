//! `RoutingSuggestion`, `RetryRecommendation`, `AgentRouting` (spec §3).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAction {
    Proceed,
    Retry,
    Skip,
    Escalate,
    Branch,
}

/// Produced by an agent, consumed by the orchestrator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingSuggestion {
    pub action: RoutingAction,
    #[serde(default)]
    pub target_steps: Vec<String>,
    pub reason: String,
    pub self_confidence: f64,
    pub priority: u8,
}

impl RoutingSuggestion {
    pub fn new(action: RoutingAction, reason: impl Into<String>, self_confidence: f64) -> Self {
        Self {
            action,
            target_steps: Vec::new(),
            reason: reason.into(),
            self_confidence,
            priority: 0,
        }
    }

    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.target_steps = targets;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// The skip suggestion appended by the base agent's phase 4 default when confidence
    /// falls below the skip threshold (self-confidence fixed at 0.9 per spec).
    pub fn default_skip(reason: impl Into<String>) -> Self {
        RoutingSuggestion::new(RoutingAction::Skip, reason, 0.9)
    }
}

/// At most one per envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryRecommendation {
    pub should_retry: bool,
    pub reason: String,
    pub suggested_changes: String,
    #[serde(default)]
    pub parameter_overrides: serde_json::Map<String, serde_json::Value>,
    pub max_retries: u32,
}

/// Lives inside the envelope.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentRouting {
    #[serde(default)]
    pub suggested_next_steps: Vec<String>,
    #[serde(default)]
    pub skip_recommendations: Vec<String>,
    #[serde(default)]
    pub escalation_needed: bool,
    #[serde(default)]
    pub escalation_reason: Option<String>,
    #[serde(default)]
    pub retry_recommendation: Option<RetryRecommendation>,
    #[serde(default)]
    pub suggestions: Vec<RoutingSuggestion>,
}

impl AgentRouting {
    pub fn needs_retry(&self) -> bool {
        self.retry_recommendation
            .as_ref()
            .is_some_and(|r| r.should_retry)
    }

    pub fn needs_escalation(&self) -> bool {
        self.escalation_needed
    }
}
