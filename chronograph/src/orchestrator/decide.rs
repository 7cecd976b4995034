//! `decide_next_steps`: the scheduling function run before every execution pass
//! (spec §4.4). Rule-based by default; escalates to an `LlmRouter` only when the
//! ready set is genuinely ambiguous, with a rule-based fallback on any failure.

use super::llm_router::LlmRouter;
use super::state::WorkflowState;
use crate::workflow::OrchestratorTuning;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Default)]
pub struct DecideNextStepsResult {
    pub steps_to_run: Vec<String>,
    pub steps_to_skip: Vec<String>,
    pub steps_to_add: Option<Vec<String>>,
    pub reasoning: String,
    pub llm_assisted: bool,
}

/// `available`: every step not yet terminal. `dependencies`: step name -> its declared
/// dependency names.
pub async fn decide_next_steps(
    available: &[String],
    dependencies: &HashMap<String, Vec<String>>,
    state: &mut WorkflowState,
    tuning: &OrchestratorTuning,
    llm_router: Option<&dyn LlmRouter>,
) -> DecideNextStepsResult {
    let completed = state.completed_steps();

    // 1. discard completed and already-skipped steps.
    let candidates: Vec<&String> = available
        .iter()
        .filter(|s| !completed.contains(*s) && !state.skipped_steps.contains(*s))
        .collect();

    // 2. ready iff every dependency is completed or skipped.
    let mut ready: Vec<String> = candidates
        .into_iter()
        .filter(|step| {
            dependencies
                .get(*step)
                .map(|deps| {
                    deps.iter()
                        .all(|d| completed.contains(d) || state.skipped_steps.contains(d))
                })
                .unwrap_or(true)
        })
        .cloned()
        .collect();

    // 3. preemptive skip on low upstream confidence.
    let mut steps_to_skip = Vec::new();
    ready.retain(|step| {
        let predecessors = dependencies.get(step).cloned().unwrap_or_default();
        let upstream = state.upstream_confidence(&predecessors);
        if upstream < tuning.skip_threshold {
            state.mark_skipped(step, "orchestrator", "upstream confidence below skip threshold");
            steps_to_skip.push(step.clone());
            false
        } else {
            true
        }
    });

    let cap = tuning.max_concurrent_steps as usize;
    let exceeds_cap = ready.len() > cap;
    let complex = state.is_complex(tuning.retry_threshold);

    if (exceeds_cap || complex) && tuning.use_llm_routing {
        if let Some(router) = llm_router {
            let summary = state_summary(state, &ready);
            match router.route(summary, &ready).await {
                Ok(decision) => {
                    return DecideNextStepsResult {
                        steps_to_run: decision.steps_to_run,
                        steps_to_skip,
                        steps_to_add: None,
                        reasoning: decision.reasoning,
                        llm_assisted: true,
                    };
                }
                Err(err) => {
                    tracing::warn!(error = %err, "llm routing failed; falling back to rule-based slice");
                }
            }
        }
    }

    // 4. cap the ready list.
    let capped: Vec<String> = ready.into_iter().take(cap).collect();
    DecideNextStepsResult {
        steps_to_run: capped,
        steps_to_skip,
        steps_to_add: None,
        reasoning: "rule-based: capped ready set by max_concurrent_steps".to_string(),
        llm_assisted: false,
    }
}

fn state_summary(state: &WorkflowState, ready: &[String]) -> serde_json::Value {
    serde_json::json!({
        "workflowId": state.id,
        "readySteps": ready,
        "completedSteps": state.completed_steps().into_iter().collect::<HashSet<_>>(),
        "skippedSteps": state.skipped_steps,
        "stepConfidence": state.step_confidence,
    })
}
