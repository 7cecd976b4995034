//! `AgentResponse`: the envelope every agent returns from `execute` (spec §4.1).

use super::metadata::AgentMetadata;
use super::routing::AgentRouting;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary of remediation an agent applied before emitting its envelope (§4.1 phase 5).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrectionsSummary {
    pub original_issue_codes: Vec<String>,
    pub quality_improvement: Option<f64>,
}

/// The uniform response object returned by every agent's `execute` call. Produced once
/// per step attempt; never mutated afterward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub data: Option<Value>,
    pub metadata: AgentMetadata,
    pub routing: AgentRouting,
    #[serde(default)]
    pub corrections: Option<CorrectionsSummary>,
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub step_name: String,
}

impl AgentResponse {
    /// `isSuccess(r) <=> data != None && confidence > 0 && no critical-non-retryable issue` (§4.1).
    pub fn is_success(&self) -> bool {
        self.data.is_some()
            && self.metadata.confidence > 0.0
            && !self.metadata.has_critical_non_retryable()
    }

    pub fn needs_retry(&self) -> bool {
        self.routing.needs_retry()
    }

    pub fn needs_escalation(&self) -> bool {
        self.routing.needs_escalation()
    }

    pub fn has_critical(&self) -> bool {
        self.metadata.has_critical()
    }

    pub fn has_retryable(&self) -> bool {
        self.metadata.has_retryable()
    }
}

/// Free-function form of the type guards, for call sites that hold a borrowed envelope
/// without wanting the inherent-method receiver syntax (mirrors spec §4.1's wording of
/// `isSuccess(r)` as a standalone predicate).
pub fn is_success(response: &AgentResponse) -> bool {
    response.is_success()
}

pub fn needs_retry(response: &AgentResponse) -> bool {
    response.needs_retry()
}

pub fn needs_escalation(response: &AgentResponse) -> bool {
    response.needs_escalation()
}

pub fn has_critical(response: &AgentResponse) -> bool {
    response.has_critical()
}

pub fn has_retryable(response: &AgentResponse) -> bool {
    response.has_retryable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::confidence::ConfidenceBreakdown;
    use crate::envelope::issue::{AgentIssue, IssueCategory, Severity};

    fn base_response(confidence_ok: bool) -> AgentResponse {
        let breakdown = if confidence_ok {
            ConfidenceBreakdown::new(0.8, 0.8, 0.8, 0.8)
        } else {
            ConfidenceBreakdown::new(0.0, 0.0, 0.0, 0.0)
        };
        AgentResponse {
            data: Some(serde_json::json!({"ok": true})),
            metadata: AgentMetadata::from_breakdown(breakdown, 10),
            routing: AgentRouting::default(),
            corrections: None,
            timestamp: Utc::now(),
            agent_id: "semantic_analyzer".into(),
            step_name: "semantic_analysis".into(),
        }
    }

    #[test]
    fn success_requires_data_confidence_and_no_hard_failure() {
        assert!(base_response(true).is_success());
        assert!(!base_response(false).is_success());
    }

    #[test]
    fn critical_non_retryable_issue_blocks_success() {
        let mut response = base_response(true);
        response.metadata.issues.push(AgentIssue::new(
            Severity::Critical,
            IssueCategory::Validation,
            "SCHEMA_MISMATCH",
            "schema mismatch",
            false,
        ));
        assert!(!response.is_success());
        assert!(has_critical(&response));
        assert!(!has_retryable(&response));
    }
}
