//! `smart_retry`: produces a concrete next-attempt parameter set plus semantic
//! guidance from the specific issues reported, not a uniform threshold tweak
//! (spec §4.4, glossary "Smart retry").

use super::state::{StepResult, WorkflowState};
use crate::envelope::{AgentIssue, IssueCategory, UpstreamContext};
use crate::workflow::OrchestratorTuning;
use serde_json::{json, Map, Value};

#[derive(Clone, Debug)]
pub struct RetryExample {
    pub good: &'static str,
    pub bad: &'static str,
}

/// Step-specific good/bad examples keyed by (stepName, issueCode), exactly the two
/// families spec.md §4.4 names.
fn catalogue_examples(step_name: &str, issue_code: &str) -> Option<RetryExample> {
    match (step_name, issue_code) {
        ("semantic_analysis", "LOW_CONFIDENCE") => Some(RetryExample {
            good: "The `PaymentProcessor.retry_with_backoff` method implements exponential backoff capped at 30s, directly mitigating the transient-failure pattern seen in commit a1b2c3d.",
            bad: "This code does something with payments.",
        }),
        ("semantic_analysis", "SHORT_INSIGHTS") => Some(RetryExample {
            good: "Extracted insight cites the specific function, the commit, and the concrete behavior change it causes.",
            bad: "Refactored some code.",
        }),
        ("insight_generation", "LOW_CONFIDENCE") => Some(RetryExample {
            good: "Insight names the affected entity, the evidence commit, and a verifiable claim about behavior.",
            bad: "Improved things.",
        }),
        _ => None,
    }
}

#[derive(Clone, Debug)]
pub struct RetryGuidance {
    pub issues: Vec<AgentIssue>,
    pub instructions: String,
    pub examples: Vec<RetryExample>,
    pub upstream_context: Vec<UpstreamContext>,
    pub attempt: u32,
}

#[derive(Clone, Debug)]
pub struct EnhancedParameters {
    pub parameters: Map<String, Value>,
    pub retry_guidance: RetryGuidance,
}

/// Rejects retry when the count is exhausted or nothing in the prior result is
/// flagged retryable (spec §4.4 rule list, first bullet).
pub fn smart_retry(
    step_name: &str,
    previous_result: &StepResult,
    original_parameters: &Map<String, Value>,
    state: &WorkflowState,
    tuning: &OrchestratorTuning,
) -> Option<EnhancedParameters> {
    let retry_count = previous_result.retry_count;
    if retry_count >= tuning.max_retries {
        return None;
    }
    let retryable_issues: Vec<AgentIssue> = previous_result
        .issues
        .iter()
        .filter(|i| i.retryable)
        .cloned()
        .collect();
    if retryable_issues.is_empty() {
        return None;
    }

    let attempt = retry_count + 1;
    let mut instructions = format!("Attempt {attempt}: ");
    instructions.push_str(
        &retryable_issues
            .iter()
            .map(|issue| match &issue.suggested_fix {
                Some(fix) => format!("{} ({})", issue.message, fix),
                None => issue.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
    );

    let examples: Vec<RetryExample> = retryable_issues
        .iter()
        .filter_map(|issue| catalogue_examples(step_name, &issue.code))
        .collect();

    let upstream_context = state
        .completed_steps()
        .into_iter()
        .filter_map(|name| {
            let result = state.step_results.get(&name)?;
            let envelope = result.envelope.as_ref()?;
            Some(UpstreamContext {
                source_agent: envelope.agent_id.clone(),
                source_step: name,
                confidence: envelope.metadata.confidence,
                relevant_issues: UpstreamContext::relevant_issues_from(&envelope.metadata.issues),
                routing_suggestions: envelope.routing.suggestions.clone(),
                key_insights: Vec::new(),
            })
        })
        .collect();

    let mut parameters = original_parameters.clone();
    apply_progressive_enhancement(step_name, attempt, &mut parameters);
    apply_category_overlays(&retryable_issues, &mut parameters);

    let guidance = RetryGuidance {
        issues: retryable_issues,
        instructions,
        examples,
        upstream_context,
        attempt,
    };
    parameters.insert(
        "_retryGuidance".to_string(),
        json!({
            "issues": guidance.issues,
            "instructions": guidance.instructions,
            "examples": guidance.examples.iter().map(|e| json!({"good": e.good, "bad": e.bad})).collect::<Vec<_>>(),
            "upstreamContext": guidance.upstream_context,
            "attempt": guidance.attempt,
        }),
    );

    Some(EnhancedParameters {
        parameters,
        retry_guidance: guidance,
    })
}

/// Progressive enhancement by step-name family (spec §4.4). `attempt` is 1-based:
/// the first retry is attempt 1, counting from the original try as attempt 0.
fn apply_progressive_enhancement(step_name: &str, attempt: u32, parameters: &mut Map<String, Value>) {
    match step_name {
        "semantic_analysis" | "batch_semantic_analysis" => {
            let threshold = 0.6 + 0.1 * attempt as f64;
            parameters.insert("semanticValueThreshold".into(), json!(threshold));
            if attempt >= 2 {
                parameters.insert("rejectGenericPatterns".into(), json!(true));
            }
            if attempt >= 3 {
                parameters.insert("requireConcreteEvidence".into(), json!(true));
                parameters.insert("analysisDepth".into(), json!("comprehensive"));
            }
        }
        "insight_generation" | "generate_insights" => {
            let min_length = 100.0 * (1.0 + 0.1 * attempt as f64);
            parameters.insert("minInsightLength".into(), json!(min_length));
            if attempt >= 2 {
                parameters.insert("requireSpecificExamples".into(), json!(true));
                parameters.insert("tier".into(), json!("premium"));
            }
            if attempt >= 3 {
                parameters.insert("validateAgainstCode".into(), json!(true));
            }
        }
        "observation_generation" => {
            parameters.insert("minObservationsPerEntity".into(), json!(2 + attempt));
            if attempt >= 2 {
                parameters.insert("rejectVague".into(), json!(true));
            }
        }
        "ontology_classification" => {
            let min_confidence = 0.6 + 0.1 * attempt as f64;
            parameters.insert("minConfidence".into(), json!(min_confidence));
            if attempt >= 3 {
                parameters.insert("strictMatching".into(), json!(true));
            }
        }
        _ => {
            if attempt >= 2 {
                parameters.insert("strictMode".into(), json!(true));
            }
            if attempt >= 3 {
                parameters.insert("enhancedValidation".into(), json!(true));
            }
        }
    }
}

fn apply_category_overlays(issues: &[AgentIssue], parameters: &mut Map<String, Value>) {
    for issue in issues {
        match issue.category {
            IssueCategory::LowConfidence => {
                parameters.insert("tier".into(), json!("premium"));
            }
            IssueCategory::DataQuality => {
                parameters.insert("validateOutput".into(), json!(true));
            }
            IssueCategory::SemanticMismatch => {
                parameters.insert("semanticValidation".into(), json!(true));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Severity;
    use crate::orchestrator::state::StepResult;

    fn retryable_result(retry_count: u32) -> StepResult {
        let mut result = StepResult::pending("semantic_analysis");
        result.retry_count = retry_count;
        result.issues.push(AgentIssue::new(
            Severity::Warning,
            IssueCategory::LowConfidence,
            "LOW_CONFIDENCE",
            "confidence too low",
            true,
        ));
        result
    }

    #[test]
    fn rejects_retry_once_max_retries_reached() {
        let state = WorkflowState::new("wf", "demo");
        let tuning = OrchestratorTuning {
            max_retries: 3,
            ..Default::default()
        };
        let result = retryable_result(3);
        assert!(smart_retry("semantic_analysis", &result, &Map::new(), &state, &tuning).is_none());
    }

    #[test]
    fn rejects_retry_when_no_issue_is_retryable() {
        let state = WorkflowState::new("wf", "demo");
        let tuning = OrchestratorTuning::default();
        let mut result = StepResult::pending("semantic_analysis");
        result.issues.push(AgentIssue::new(
            Severity::Warning,
            IssueCategory::LowConfidence,
            "LOW_CONFIDENCE",
            "confidence too low",
            false,
        ));
        assert!(smart_retry("semantic_analysis", &result, &Map::new(), &state, &tuning).is_none());
    }

    /// **Scenario**: smart retry of `semantic_analysis` (spec §8 scenario 3) —
    /// attempt 1 sets threshold 0.7 and tier premium (via the low_confidence
    /// overlay); attempt 2 bumps to 0.8 with concrete-evidence-adjacent flags;
    /// attempt 3 sets analysisDepth to comprehensive.
    #[test]
    fn semantic_analysis_progressively_enhances_parameters() {
        let state = WorkflowState::new("wf", "demo");
        let tuning = OrchestratorTuning {
            max_retries: 5,
            ..Default::default()
        };

        let attempt1 = smart_retry("semantic_analysis", &retryable_result(0), &Map::new(), &state, &tuning).unwrap();
        assert_eq!(attempt1.parameters["semanticValueThreshold"], json!(0.7));
        assert_eq!(attempt1.parameters["tier"], json!("premium"));
        assert!(attempt1.parameters.get("rejectGenericPatterns").is_none());

        let attempt2 = smart_retry("semantic_analysis", &retryable_result(1), &Map::new(), &state, &tuning).unwrap();
        assert_eq!(attempt2.parameters["semanticValueThreshold"], json!(0.8));
        assert_eq!(attempt2.parameters["rejectGenericPatterns"], json!(true));

        let attempt3 = smart_retry("semantic_analysis", &retryable_result(2), &Map::new(), &state, &tuning).unwrap();
        assert_eq!(attempt3.parameters["analysisDepth"], json!("comprehensive"));
        assert_eq!(attempt3.parameters["requireConcreteEvidence"], json!(true));
    }

    /// **Scenario**: monotonicity law (spec §8) — every numeric threshold is
    /// non-decreasing and every feature flag, once set, stays set across retries.
    #[test]
    fn successive_retries_are_pointwise_stricter() {
        let state = WorkflowState::new("wf", "demo");
        let tuning = OrchestratorTuning {
            max_retries: 5,
            ..Default::default()
        };
        for step in ["semantic_analysis", "insight_generation", "observation_generation", "ontology_classification", "other_step"] {
            let mut prev: Option<Map<String, Value>> = None;
            for retry_count in 0..4u32 {
                let mut result = StepResult::pending(step);
                result.retry_count = retry_count;
                result.issues.push(AgentIssue::new(
                    Severity::Warning,
                    IssueCategory::LowConfidence,
                    "LOW_CONFIDENCE",
                    "confidence too low",
                    true,
                ));
                let enhanced = smart_retry(step, &result, &Map::new(), &state, &tuning).unwrap();
                if let Some(prev_params) = &prev {
                    for (key, prev_value) in prev_params {
                        if key == "_retryGuidance" {
                            continue;
                        }
                        let current_value = &enhanced.parameters[key];
                        match (prev_value, current_value) {
                            (Value::Number(p), Value::Number(c)) => {
                                assert!(c.as_f64().unwrap() >= p.as_f64().unwrap(), "{key} regressed for {step}");
                            }
                            (Value::Bool(true), Value::Bool(c)) => assert!(*c, "{key} flag regressed for {step}"),
                            _ => {}
                        }
                    }
                }
                prev = Some(enhanced.parameters);
            }
        }
    }
}
