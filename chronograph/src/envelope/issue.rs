//! `AgentIssue`: a single problem an agent reports about its own output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    DataQuality,
    MissingData,
    LowConfidence,
    ProcessingError,
    Timeout,
    ExternalService,
    Validation,
    SemanticMismatch,
}

/// A problem reported by an agent about its own output. Immutable once emitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    /// Stable machine-readable code, e.g. `"LOW_CONFIDENCE"` or `"UPSTREAM_CRITICAL_ISSUE"`.
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub affected_entities: Vec<String>,
    #[serde(default)]
    pub suggested_fix: Option<String>,
    pub retryable: bool,
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

impl AgentIssue {
    pub fn new(
        severity: Severity,
        category: IssueCategory,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            severity,
            category,
            code: code.into(),
            message: message.into(),
            affected_entities: Vec::new(),
            suggested_fix: None,
            retryable,
            context: HashMap::new(),
        }
    }

    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    pub fn with_affected_entities(mut self, entities: Vec<String>) -> Self {
        self.affected_entities = entities;
        self
    }

    /// The issue attached to every step invocation by the base agent whenever a critical
    /// predecessor issue exists upstream (§4.1 phase 3, §7 propagation rule).
    pub fn upstream_critical(message: impl Into<String>) -> Self {
        AgentIssue::new(
            Severity::Warning,
            IssueCategory::ProcessingError,
            "UPSTREAM_CRITICAL_ISSUE",
            message,
            false,
        )
    }

    /// The issue attached to the standard error envelope on a failed `process` call.
    pub fn execution_error(message: impl Into<String>) -> Self {
        AgentIssue::new(
            Severity::Critical,
            IssueCategory::ProcessingError,
            "AGENT_EXECUTION_ERROR",
            message,
            true,
        )
    }

    pub fn is_critical_non_retryable(&self) -> bool {
        self.severity == Severity::Critical && !self.retryable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_is_critical_and_retryable() {
        let issue = AgentIssue::execution_error("boom");
        assert_eq!(issue.severity, Severity::Critical);
        assert!(issue.retryable);
        assert!(!issue.is_critical_non_retryable());
    }

    #[test]
    fn critical_non_retryable_issue_is_detected() {
        let issue = AgentIssue::new(
            Severity::Critical,
            IssueCategory::Validation,
            "SCHEMA_MISMATCH",
            "schema mismatch",
            false,
        );
        assert!(issue.is_critical_non_retryable());
    }
}
