//! `WorkflowState`: the orchestrator's single mutable record of one workflow run
//! (spec §3, §4.4). Agents never see or mutate this directly — only the
//! orchestrator does, in response to an envelope.

use crate::envelope::{AgentIssue, AgentResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Running,
    Completed,
    Failed,
    Terminated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
    Retrying,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecisionAction {
    Proceed,
    Retry,
    SkipDownstream,
    Escalate,
    Terminate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub action: RoutingDecisionAction,
    pub affected_steps: Vec<String>,
    pub reason: String,
    #[serde(default)]
    pub retry_guidance: Option<Value>,
    pub confidence: f64,
    pub llm_assisted: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationKind {
    Skip,
    Add,
    Reorder,
    Retry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowModification {
    pub kind: ModificationKind,
    pub step_name: String,
    pub source: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RetryHistory {
    pub count: u32,
    pub last_reason: Option<String>,
    pub confidence_progression: Vec<f64>,
    pub accumulated_issues: Vec<AgentIssue>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub status: StepStatus,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub envelope: Option<AgentResponse>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub issues: Vec<AgentIssue>,
    pub retry_count: u32,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub routing_decision: Option<RoutingDecisionAction>,
}

impl StepResult {
    pub fn pending(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Pending,
            payload: None,
            envelope: None,
            confidence: None,
            issues: Vec::new(),
            retry_count: 0,
            started_at: None,
            completed_at: None,
            routing_decision: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub status: WorkflowStatus,
    pub step_results: HashMap<String, StepResult>,
    pub step_confidence: HashMap<String, f64>,
    pub routing_history: Vec<RoutingDecision>,
    pub modifications: Vec<WorkflowModification>,
    pub retry_history: HashMap<String, RetryHistory>,
    pub skipped_steps: HashSet<String>,
    pub added_steps: Vec<String>,
}

impl WorkflowState {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_time: Utc::now(),
            status: WorkflowStatus::Running,
            step_results: HashMap::new(),
            step_confidence: HashMap::new(),
            routing_history: Vec::new(),
            modifications: Vec::new(),
            retry_history: HashMap::new(),
            skipped_steps: HashSet::new(),
            added_steps: Vec::new(),
        }
    }

    pub fn completed_steps(&self) -> HashSet<String> {
        self.step_results
            .values()
            .filter(|r| r.status == StepStatus::Completed)
            .map(|r| r.step_name.clone())
            .collect()
    }

    /// Upstream confidence for a step: arithmetic mean of its predecessors' overall
    /// confidences, or 1.0 if it has none (spec §4.4 rule 3, §8 boundary behavior).
    pub fn upstream_confidence(&self, predecessors: &[String]) -> f64 {
        if predecessors.is_empty() {
            return 1.0;
        }
        let present: Vec<f64> = predecessors
            .iter()
            .filter_map(|p| self.step_confidence.get(p).copied())
            .collect();
        if present.is_empty() {
            return 1.0;
        }
        present.iter().sum::<f64>() / present.len() as f64
    }

    pub fn mark_skipped(&mut self, step_name: &str, source: &str, reason: &str) {
        self.skipped_steps.insert(step_name.to_string());
        let result = self
            .step_results
            .entry(step_name.to_string())
            .or_insert_with(|| StepResult::pending(step_name));
        result.status = StepStatus::Skipped;
        self.modifications.push(WorkflowModification {
            kind: ModificationKind::Skip,
            step_name: step_name.to_string(),
            source: source.to_string(),
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// "Complex" per spec §4.4 rule 5: any retry count > 0, any skipped step, or
    /// at least 3 steps below the retry threshold.
    pub fn is_complex(&self, retry_threshold: f64) -> bool {
        let any_retry = self.retry_history.values().any(|h| h.count > 0);
        let any_skipped = !self.skipped_steps.is_empty();
        let low_confidence_count = self
            .step_confidence
            .values()
            .filter(|&&c| c < retry_threshold)
            .count();
        any_retry || any_skipped || low_confidence_count >= 3
    }
}
