//! `BaseAgent<A>`: wraps a domain-specific [`Agent`] in the six fixed envelope phases
//! of spec §4.1. The phase order below must never be reordered by a concrete agent.

use super::{Agent, AgentContext, ExecutableAgent};
use crate::envelope::confidence::{weighted_upstream_influence, ConfidenceBreakdown};
use crate::envelope::issue::{AgentIssue, Severity};
use crate::envelope::routing::{AgentRouting, RetryRecommendation, RoutingSuggestion};
use crate::envelope::{AgentMetadata, AgentResponse};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::time::Instant;

/// Confidence threshold below which a retry recommendation is attached (§4.1 phase 4).
pub const RETRY_THRESHOLD: f64 = 0.5;
/// Confidence threshold below which a skip suggestion is appended (§4.1 phase 4).
pub const SKIP_THRESHOLD: f64 = 0.3;
/// Retry attempts are capped at 3 (§4.1: "current retry attempt < 3").
pub const MAX_AUTO_RETRY_ATTEMPTS: u32 = 3;

/// Wraps a concrete [`Agent`] so every invocation produces a standard envelope.
pub struct BaseAgent<A: Agent> {
    inner: A,
}

impl<A: Agent> BaseAgent<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    fn standard_error_envelope(
        &self,
        step_name: &str,
        attempt: u32,
        message: String,
        elapsed_ms: u64,
    ) -> AgentResponse {
        let issue = AgentIssue::execution_error(message);
        let mut routing = AgentRouting::default();
        if attempt < MAX_AUTO_RETRY_ATTEMPTS {
            routing.retry_recommendation = Some(RetryRecommendation {
                should_retry: true,
                reason: issue.message.clone(),
                suggested_changes: issue
                    .suggested_fix
                    .clone()
                    .unwrap_or_else(|| "retry the step".to_string()),
                parameter_overrides: serde_json::Map::new(),
                max_retries: MAX_AUTO_RETRY_ATTEMPTS,
            });
        }
        let breakdown = ConfidenceBreakdown::new(0.0, 0.0, 0.0, 0.0);
        let mut metadata = AgentMetadata::from_breakdown(breakdown, elapsed_ms);
        metadata.issues.push(issue);
        AgentResponse {
            data: None,
            metadata,
            routing,
            corrections: None,
            timestamp: Utc::now(),
            agent_id: self.inner.id().to_string(),
            step_name: step_name.to_string(),
        }
    }
}

#[async_trait]
impl<A: Agent> ExecutableAgent for BaseAgent<A> {
    async fn execute(&self, input: Value, context: &AgentContext, step_name: &str) -> AgentResponse {
        let started = Instant::now();

        // Phase 1: invoke the subclass.
        let outcome = match self.inner.process(input, context).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                return self.standard_error_envelope(
                    step_name,
                    context.retry_attempt,
                    err.to_string(),
                    elapsed_ms,
                );
            }
        };

        // Phase 2: confidence.
        let predecessors: Vec<(f64, bool, bool)> = context
            .upstream_contexts
            .iter()
            .map(|u| {
                let has_critical = u
                    .relevant_issues
                    .iter()
                    .any(|i| i.severity == Severity::Critical);
                let has_warning = u
                    .relevant_issues
                    .iter()
                    .any(|i| i.severity == Severity::Warning);
                (u.confidence, has_critical, has_warning)
            })
            .collect();
        let upstream_influence = weighted_upstream_influence(&predecessors);
        let mut breakdown = ConfidenceBreakdown::new(
            outcome.data_completeness.unwrap_or(0.8),
            outcome.semantic_coherence.unwrap_or(0.8),
            upstream_influence,
            outcome.processing_quality.unwrap_or(0.8),
        );
        if let Some(ev) = outcome.external_validation {
            breakdown = breakdown.with_external_validation(ev);
        }
        let confidence = breakdown.overall_confidence();

        // Phase 3: issue detection. Critical upstream issues always re-propagate as a warning.
        let mut issues = outcome.issues;
        if context.has_upstream_critical() {
            issues.push(AgentIssue::upstream_critical(
                "an upstream step reported a critical issue",
            ));
        }

        // Phase 4: routing suggestions.
        let mut routing = AgentRouting {
            suggested_next_steps: outcome.suggested_next_steps,
            skip_recommendations: outcome.skip_recommendations,
            suggestions: outcome.suggestions,
            ..Default::default()
        };
        let any_retryable = issues.iter().any(|i| i.retryable);
        if confidence < RETRY_THRESHOLD && any_retryable && context.retry_attempt < MAX_AUTO_RETRY_ATTEMPTS {
            let suggested_changes = issues
                .iter()
                .filter(|i| i.retryable)
                .filter_map(|i| i.suggested_fix.clone())
                .collect::<Vec<_>>()
                .join("; ");
            routing.retry_recommendation = Some(RetryRecommendation {
                should_retry: true,
                reason: "confidence below retry threshold".to_string(),
                suggested_changes,
                parameter_overrides: serde_json::Map::new(),
                max_retries: MAX_AUTO_RETRY_ATTEMPTS,
            });
        }
        let critical_non_retryable: Vec<&AgentIssue> = issues
            .iter()
            .filter(|i| i.is_critical_non_retryable())
            .collect();
        if !critical_non_retryable.is_empty() {
            routing.escalation_needed = true;
            routing.escalation_reason = Some(
                critical_non_retryable
                    .iter()
                    .map(|i| i.message.clone())
                    .collect::<Vec<_>>()
                    .join("; "),
            );
        }
        if confidence < SKIP_THRESHOLD {
            routing
                .suggestions
                .push(RoutingSuggestion::default_skip("confidence below skip threshold"));
        }

        // Phase 5: corrections (optional, pass through from the subclass).
        let corrections = outcome.corrections;

        // Phase 6: metadata assembly and envelope construction.
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let mut metadata = AgentMetadata::from_breakdown(breakdown, elapsed_ms);
        metadata.issues = issues;
        metadata.model_id = outcome.model_id;
        metadata.token_count = outcome.token_count;
        metadata.upstream_contexts = context.upstream_contexts.clone();

        AgentResponse {
            data: outcome.data,
            metadata,
            routing,
            corrections,
            timestamp: Utc::now(),
            agent_id: self.inner.id().to_string(),
            step_name: step_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::error::AgentError;
    use crate::agent::ProcessOutcome;
    use async_trait::async_trait;

    struct StubAgent {
        result: Result<ProcessOutcome, String>,
    }

    #[async_trait]
    impl Agent for StubAgent {
        fn id(&self) -> &str {
            "stub_agent"
        }

        async fn process(
            &self,
            _input: Value,
            _context: &AgentContext,
        ) -> Result<ProcessOutcome, AgentError> {
            self.result
                .clone()
                .map_err(AgentError::Execution)
        }
    }

    /// **Scenario**: a successful process call with no overrides produces a high-confidence
    /// envelope and no retry/escalation routing.
    #[tokio::test]
    async fn happy_path_produces_success_envelope() {
        let agent = BaseAgent::new(StubAgent {
            result: Ok(ProcessOutcome::with_data(serde_json::json!({"ok": true}))),
        });
        let response = agent
            .execute(Value::Null, &AgentContext::default(), "semantic_analysis")
            .await;
        assert!(response.is_success());
        assert!(!response.needs_retry());
        assert!(!response.needs_escalation());
    }

    /// **Scenario**: `process` returns `Err`; the base produces the standard error
    /// envelope with confidence 0 and a retryable execution-error issue.
    #[tokio::test]
    async fn process_error_yields_standard_error_envelope() {
        let agent = BaseAgent::new(StubAgent {
            result: Err("boom".to_string()),
        });
        let response = agent
            .execute(Value::Null, &AgentContext::default(), "semantic_analysis")
            .await;
        assert!(response.data.is_none());
        assert_eq!(response.metadata.confidence, 0.0);
        assert!(response.has_critical());
        assert!(response.has_retryable());
        assert!(response.needs_retry());
    }

    /// **Scenario**: at the third retry attempt, the standard error envelope stops
    /// recommending another retry (§4.1: "retry recommendation if attempt < 3").
    #[tokio::test]
    async fn error_envelope_stops_recommending_retry_past_max_attempts() {
        let agent = BaseAgent::new(StubAgent {
            result: Err("boom".to_string()),
        });
        let context = AgentContext {
            retry_attempt: MAX_AUTO_RETRY_ATTEMPTS,
            ..Default::default()
        };
        let response = agent.execute(Value::Null, &context, "semantic_analysis").await;
        assert!(!response.needs_retry());
    }
}
