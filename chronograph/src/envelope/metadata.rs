//! `AgentMetadata` and `UpstreamContext` (spec §3).

use super::confidence::ConfidenceBreakdown;
use super::issue::{AgentIssue, Severity};
use super::routing::RoutingSuggestion;
use serde::{Deserialize, Serialize};

/// Lives inside the envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub confidence: f64,
    pub breakdown: ConfidenceBreakdown,
    pub quality_score: u8,
    #[serde(default)]
    pub issues: Vec<AgentIssue>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub token_count: Option<u64>,
    #[serde(default)]
    pub upstream_contexts: Vec<UpstreamContext>,
}

impl AgentMetadata {
    pub fn from_breakdown(breakdown: ConfidenceBreakdown, processing_time_ms: u64) -> Self {
        let confidence = breakdown.overall_confidence();
        let quality_score = breakdown.quality_score();
        Self {
            confidence,
            breakdown,
            quality_score,
            issues: Vec::new(),
            warnings: Vec::new(),
            processing_time_ms,
            model_id: None,
            token_count: None,
            upstream_contexts: Vec::new(),
        }
    }

    pub fn has_critical(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn has_retryable(&self) -> bool {
        self.issues.iter().any(|i| i.retryable)
    }

    pub fn has_critical_non_retryable(&self) -> bool {
        self.issues.iter().any(AgentIssue::is_critical_non_retryable)
    }
}

/// Derived from a completed envelope and injected into a downstream agent's invocation
/// context. `relevant_issues` is filtered to severity >= warning per spec §3.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamContext {
    pub source_agent: String,
    pub source_step: String,
    pub confidence: f64,
    pub relevant_issues: Vec<AgentIssue>,
    pub routing_suggestions: Vec<RoutingSuggestion>,
    pub key_insights: Vec<String>,
}

impl UpstreamContext {
    pub fn relevant_issues_from(issues: &[AgentIssue]) -> Vec<AgentIssue> {
        issues
            .iter()
            .filter(|i| i.severity >= Severity::Warning)
            .cloned()
            .collect()
    }
}
