//! `interpret_result`: the decision gate run after every step attempt (spec §4.4).

use super::state::{RoutingDecision, RoutingDecisionAction, StepResult, StepStatus, WorkflowState};
use crate::envelope::AgentResponse;
use crate::workflow::OrchestratorTuning;
use chrono::Utc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpretAction {
    Proceed,
    Retry,
    SkipDownstream,
    Terminate,
}

/// Stores the step result, decides the next action, and mutates `state` in place
/// (marking skipped downstream steps, recording modifications and routing history).
/// Returns the gate decision plus, on `Terminate`, the triggering message.
pub fn interpret_result(
    step_name: &str,
    envelope: &AgentResponse,
    state: &mut WorkflowState,
    tuning: &OrchestratorTuning,
) -> (InterpretAction, Option<String>) {
    let retry_count = state
        .step_results
        .get(step_name)
        .map(|r| r.retry_count)
        .unwrap_or(0);

    let mut modified = false;

    // 1. store the StepResult and per-step confidence.
    state.step_confidence.insert(step_name.to_string(), envelope.metadata.confidence);
    let result = StepResult {
        step_name: step_name.to_string(),
        status: StepStatus::Completed,
        payload: envelope.data.clone(),
        envelope: Some(envelope.clone()),
        confidence: Some(envelope.metadata.confidence),
        issues: envelope.metadata.issues.clone(),
        retry_count,
        started_at: None,
        completed_at: Some(Utc::now()),
        routing_decision: None,
    };
    state.step_results.insert(step_name.to_string(), result);

    // 2. critical non-retryable -> terminate.
    if let Some(issue) = envelope.metadata.issues.iter().find(|i| i.is_critical_non_retryable()) {
        state.status = super::state::WorkflowStatus::Terminated;
        record_decision(state, RoutingDecisionAction::Terminate, vec![step_name.to_string()], issue.message.clone(), envelope.metadata.confidence, false);
        return (InterpretAction::Terminate, Some(issue.message.clone()));
    }

    // 3. retry recommendation, bounded by max_retries.
    if envelope.needs_retry() {
        if retry_count < tuning.max_retries {
            if let Some(result) = state.step_results.get_mut(step_name) {
                result.status = StepStatus::Retrying;
                result.retry_count = retry_count + 1;
            }
            let history = state.retry_history.entry(step_name.to_string()).or_default();
            history.count += 1;
            history.confidence_progression.push(envelope.metadata.confidence);
            history.accumulated_issues.extend(envelope.metadata.issues.clone());
            if let Some(recommendation) = &envelope.routing.retry_recommendation {
                history.last_reason = Some(recommendation.reason.clone());
            }
            record_decision(state, RoutingDecisionAction::Retry, vec![step_name.to_string()], "retry recommendation accepted".to_string(), envelope.metadata.confidence, false);
            return (InterpretAction::Retry, None);
        }

        // retries exhausted with a still-retryable issue: terminate, don't proceed (§3, §7, §8).
        state.status = super::state::WorkflowStatus::Terminated;
        let message = format!("step '{step_name}' exhausted max_retries ({}) with a retryable issue", tuning.max_retries);
        record_decision(state, RoutingDecisionAction::Terminate, vec![step_name.to_string()], message.clone(), envelope.metadata.confidence, false);
        return (InterpretAction::Terminate, Some(message));
    }

    // 4. skip recommendations.
    for target in &envelope.routing.skip_recommendations {
        state.mark_skipped(target, step_name, "skip recommendation from upstream step");
        modified = true;
    }

    // 5. log suggested next steps without mutating the DAG (open question, spec §9).
    if !envelope.routing.suggested_next_steps.is_empty() {
        tracing::info!(step = step_name, suggested = ?envelope.routing.suggested_next_steps, "suggested next steps recorded, not applied");
    }

    // 6. escalation is logged, never blocking.
    if envelope.routing.escalation_needed {
        tracing::warn!(step = step_name, reason = ?envelope.routing.escalation_reason, "agent requested escalation");
    }

    // 7. skip_downstream iff a modification occurred this pass.
    let action = if modified {
        InterpretAction::SkipDownstream
    } else {
        InterpretAction::Proceed
    };
    let decision_action = if modified {
        RoutingDecisionAction::SkipDownstream
    } else {
        RoutingDecisionAction::Proceed
    };
    record_decision(state, decision_action, vec![step_name.to_string()], format!("step '{step_name}' completed"), envelope.metadata.confidence, false);
    (action, None)
}

fn record_decision(state: &mut WorkflowState, action: RoutingDecisionAction, affected_steps: Vec<String>, reason: String, confidence: f64, llm_assisted: bool) {
    state.routing_history.push(RoutingDecision {
        action,
        affected_steps,
        reason,
        retry_guidance: None,
        confidence,
        llm_assisted,
        timestamp: Utc::now(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{AgentIssue, AgentMetadata, AgentRouting, ConfidenceBreakdown, IssueCategory, RetryRecommendation, Severity};

    fn envelope_with(confidence: f64, issues: Vec<AgentIssue>, routing: AgentRouting) -> AgentResponse {
        let breakdown = ConfidenceBreakdown::new(confidence, confidence, confidence, confidence);
        let mut metadata = AgentMetadata::from_breakdown(breakdown, 5);
        metadata.confidence = confidence;
        metadata.issues = issues;
        AgentResponse {
            data: Some(serde_json::json!({})),
            metadata,
            routing,
            corrections: None,
            timestamp: Utc::now(),
            agent_id: "agent".into(),
            step_name: "a".into(),
        }
    }

    /// **Scenario**: critical non-retryable abort (spec §8 scenario 2).
    #[test]
    fn critical_non_retryable_issue_terminates_workflow() {
        let mut state = WorkflowState::new("wf", "demo");
        let tuning = OrchestratorTuning::default();
        let issue = AgentIssue::new(Severity::Critical, IssueCategory::Validation, "SCHEMA_MISMATCH", "schema mismatch", false);
        let envelope = envelope_with(0.9, vec![issue], AgentRouting::default());
        let (action, message) = interpret_result("a", &envelope, &mut state, &tuning);
        assert_eq!(action, InterpretAction::Terminate);
        assert_eq!(message.unwrap(), "schema mismatch");
        assert_eq!(state.status, super::super::state::WorkflowStatus::Terminated);
    }

    #[test]
    fn retry_recommendation_advances_retry_count_until_max() {
        let mut state = WorkflowState::new("wf", "demo");
        let tuning = OrchestratorTuning { max_retries: 1, ..Default::default() };
        let mut routing = AgentRouting::default();
        routing.retry_recommendation = Some(RetryRecommendation {
            should_retry: true,
            reason: "low confidence".into(),
            suggested_changes: "raise threshold".into(),
            parameter_overrides: Default::default(),
            max_retries: 3,
        });
        let envelope = envelope_with(0.3, vec![], routing);
        let (action, _) = interpret_result("a", &envelope, &mut state, &tuning);
        assert_eq!(action, InterpretAction::Retry);
        assert_eq!(state.step_results["a"].retry_count, 1);

        // second attempt: retry_count (1) is now == max_retries (1); still retryable, so
        // the workflow terminates rather than proceeding as if the step had succeeded.
        let (action2, message2) = interpret_result("a", &envelope, &mut state, &tuning);
        assert_eq!(action2, InterpretAction::Terminate);
        assert!(message2.unwrap().contains("exhausted max_retries"));
        assert_eq!(state.status, super::super::state::WorkflowStatus::Terminated);
    }

    /// **Scenario**: skip cascade (spec §8 scenario 4) — step A's skip recommendation
    /// marks C skipped with source "a".
    #[test]
    fn skip_recommendations_mark_downstream_steps_skipped() {
        let mut state = WorkflowState::new("wf", "demo");
        let tuning = OrchestratorTuning::default();
        let mut routing = AgentRouting::default();
        routing.skip_recommendations = vec!["c".to_string()];
        let envelope = envelope_with(0.2, vec![], routing);
        let (action, _) = interpret_result("a", &envelope, &mut state, &tuning);
        assert_eq!(action, InterpretAction::SkipDownstream);
        assert!(state.skipped_steps.contains("c"));
        assert_eq!(state.modifications[0].source, "a");
    }
}
