//! `SmartOrchestrator`: owns one workflow run, schedules ready steps under a
//! concurrency cap, and drives every envelope through `interpret_result`
//! (spec §4.4, §5).

use super::decide::decide_next_steps;
use super::error::OrchestratorError;
use super::interpret::{interpret_result, InterpretAction};
use super::llm_router::LlmRouter;
use super::retry::smart_retry;
use super::state::{StepStatus, WorkflowState, WorkflowStatus};
use crate::agent::{AgentContext, AgentRegistry};
use crate::envelope::{
    AgentIssue, AgentMetadata, AgentResponse, AgentRouting, ConfidenceBreakdown, IssueCategory,
    RetryRecommendation, Severity, UpstreamContext,
};
use crate::workflow::{OrchestratorTuning, WorkflowDefinition, WorkflowRunnerTuning};
use chrono::Utc;
use chronograph_event::WorkflowEvent;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify, RwLock, Semaphore};
use tokio::task::JoinSet;

/// Synthesizes the standard error envelope for a step whose agent call did not
/// complete within its budget (spec §5: "the orchestrator treats the step as having
/// produced an error envelope with a `timeout` category").
fn timeout_envelope(agent_id: &str, step_name: &str, timeout_seconds: u64, max_retries: u32) -> AgentResponse {
    let issue = AgentIssue::new(
        Severity::Critical,
        IssueCategory::Timeout,
        "STEP_TIMEOUT",
        format!("step '{step_name}' exceeded its {timeout_seconds}s timeout"),
        true,
    );
    let mut routing = AgentRouting::default();
    routing.retry_recommendation = Some(RetryRecommendation {
        should_retry: true,
        reason: issue.message.clone(),
        suggested_changes: "retry the step".to_string(),
        parameter_overrides: Map::new(),
        max_retries,
    });
    let breakdown = ConfidenceBreakdown::new(0.0, 0.0, 0.0, 0.0);
    let mut metadata = AgentMetadata::from_breakdown(breakdown, timeout_seconds.saturating_mul(1000));
    metadata.issues.push(issue);
    AgentResponse {
        data: None,
        metadata,
        routing,
        corrections: None,
        timestamp: Utc::now(),
        agent_id: agent_id.to_string(),
        step_name: step_name.to_string(),
    }
}

pub struct SmartOrchestrator {
    workflow_id: String,
    definition: WorkflowDefinition,
    registry: AgentRegistry,
    tuning: OrchestratorTuning,
    runner_tuning: WorkflowRunnerTuning,
    llm_router: Option<Arc<dyn LlmRouter>>,
    events: broadcast::Sender<WorkflowEvent>,
    state: RwLock<WorkflowState>,
    single_step_mode: AtomicBool,
    step_advance: Notify,
    cancelled: AtomicBool,
    paused: AtomicBool,
    resume_notify: Notify,
}

impl SmartOrchestrator {
    pub fn new(
        workflow_id: impl Into<String>,
        definition: WorkflowDefinition,
        registry: AgentRegistry,
        tuning: OrchestratorTuning,
        llm_router: Option<Arc<dyn LlmRouter>>,
    ) -> Self {
        Self::with_runner_tuning(workflow_id, definition, registry, tuning, WorkflowRunnerTuning::default(), llm_router)
    }

    /// Like [`Self::new`] but with an explicit [`WorkflowRunnerTuning`] (heartbeat interval,
    /// mock LLM delay) instead of its defaults.
    pub fn with_runner_tuning(
        workflow_id: impl Into<String>,
        definition: WorkflowDefinition,
        registry: AgentRegistry,
        tuning: OrchestratorTuning,
        runner_tuning: WorkflowRunnerTuning,
        llm_router: Option<Arc<dyn LlmRouter>>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        let workflow_id = workflow_id.into();
        let name = definition.name.clone();
        Self {
            state: RwLock::new(WorkflowState::new(workflow_id.clone(), name)),
            workflow_id,
            definition,
            registry,
            tuning,
            runner_tuning,
            llm_router,
            events,
            single_step_mode: AtomicBool::new(false),
            step_advance: Notify::new(),
            cancelled: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    /// Clones the orchestrator's own broadcast sender so an external transport (e.g.
    /// `chronograph-relay`) can forward this run's events without an extra relay task.
    pub fn events_sender(&self) -> broadcast::Sender<WorkflowEvent> {
        self.events.clone()
    }

    pub fn set_single_step_mode(&self, enabled: bool) {
        self.single_step_mode.store(enabled, Ordering::SeqCst);
    }

    pub fn advance_single_step(&self) {
        self.step_advance.notify_one();
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Suspends the run at its next step boundary. Idempotent; emits `WorkflowPaused`
    /// only on the transition into paused (spec §4.5).
    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            self.emit(WorkflowEvent::WorkflowPaused { workflow_id: self.workflow_id.clone() });
        }
    }

    /// Releases a paused run. Idempotent; emits `WorkflowResumed` only on the transition
    /// out of paused.
    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            self.emit(WorkflowEvent::WorkflowResumed { workflow_id: self.workflow_id.clone() });
        }
        self.resume_notify.notify_waiters();
    }

    pub async fn state_snapshot(&self) -> WorkflowState {
        self.state.read().await.clone()
    }

    fn emit(&self, event: WorkflowEvent) {
        let _ = self.events.send(event);
    }


    /// Runs every declared step to a terminal state and returns the final
    /// `WorkflowState`. Steps run concurrently up to `tuning.max_concurrent_steps`;
    /// `decide_next_steps` is the sole authority on what starts in a given pass.
    pub async fn run(&self, initial_input: Value) -> Result<WorkflowState, OrchestratorError> {
        let workflow_id = self.state.read().await.id.clone();
        self.emit(WorkflowEvent::WorkflowStarted {
            workflow_id: workflow_id.clone(),
            name: self.definition.name.clone(),
        });

        let dependencies: HashMap<String, Vec<String>> = self
            .definition
            .steps
            .iter()
            .map(|s| (s.name.clone(), s.dependencies.clone()))
            .collect();
        let all_steps: Vec<String> = self.definition.steps.iter().map(|s| s.name.clone()).collect();
        let mut parameters: HashMap<String, Map<String, Value>> = self
            .definition
            .steps
            .iter()
            .map(|s| (s.name.clone(), s.parameters.clone()))
            .collect();

        // Seed every root step (no dependencies) with the run's initial input, under
        // a conventional "input" key, without overriding a parameter the workflow
        // already declared under that name.
        if !initial_input.is_null() {
            for step in self.definition.steps.iter().filter(|s| s.dependencies.is_empty()) {
                if let Some(step_params) = parameters.get_mut(&step.name) {
                    step_params.entry("input").or_insert_with(|| initial_input.clone());
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.tuning.max_concurrent_steps as usize));
        let mut in_flight: JoinSet<(String, crate::envelope::AgentResponse)> = JoinSet::new();
        let mut running: std::collections::HashSet<String> = std::collections::HashSet::new();

        let mut heartbeat = tokio::time::interval(Duration::from_millis(self.runner_tuning.heartbeat_interval_ms.max(1)));
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        heartbeat.tick().await;

        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                let mut state = self.state.write().await;
                state.status = WorkflowStatus::Terminated;
                self.emit(WorkflowEvent::WorkflowFailed {
                    workflow_id: workflow_id.clone(),
                    reason: "cancelled".to_string(),
                });
                return Ok(state.clone());
            }

            while self.paused.load(Ordering::SeqCst) {
                self.resume_notify.notified().await;
            }

            let available: Vec<String> = all_steps
                .iter()
                .filter(|s| !running.contains(*s))
                .cloned()
                .collect();

            let decision = {
                let mut state = self.state.write().await;
                decide_next_steps(&available, &dependencies, &mut state, &self.tuning, self.llm_router.as_deref()).await
            };

            if in_flight.is_empty() && decision.steps_to_run.is_empty() {
                break;
            }

            for step_name in decision.steps_to_run {
                let step_def = self
                    .definition
                    .steps
                    .iter()
                    .find(|s| s.name == step_name)
                    .ok_or_else(|| OrchestratorError::UnknownStep(step_name.clone()))?;
                let agent = self
                    .registry
                    .get(&step_def.agent_id)
                    .ok_or_else(|| OrchestratorError::UnknownAgent(step_name.clone(), step_def.agent_id.clone()))?;

                running.insert(step_name.clone());
                self.emit(WorkflowEvent::StepStarted {
                    workflow_id: workflow_id.clone(),
                    step_name: step_name.clone(),
                });

                let upstream_contexts = self.upstream_contexts_for(&dependencies, &step_name).await;
                let retry_attempt = {
                    let state = self.state.read().await;
                    state.step_results.get(&step_name).map(|r| r.retry_count).unwrap_or(0)
                };
                let step_params = parameters.get(&step_name).cloned().unwrap_or_default();
                let input = Value::Object(step_params);
                let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
                let agent = agent.clone();
                let step_name_task = step_name.clone();
                let agent_id = step_def.agent_id.clone();
                let timeout_seconds = step_def.timeout_seconds.unwrap_or(self.tuning.default_step_timeout_seconds);
                let max_retries = self.tuning.max_retries;
                in_flight.spawn(async move {
                    let _permit = permit;
                    let context = AgentContext {
                        upstream_contexts,
                        retry_attempt,
                        parameters: Map::new(),
                    };
                    let response = tokio::time::timeout(Duration::from_secs(timeout_seconds), agent.execute(input, &context, &step_name_task))
                        .await
                        .unwrap_or_else(|_| timeout_envelope(&agent_id, &step_name_task, timeout_seconds, max_retries));
                    (step_name_task, response)
                });
            }

            tokio::select! {
                _ = heartbeat.tick() => {
                    let status = self.state.read().await.status;
                    self.emit(WorkflowEvent::Heartbeat {
                        workflow_id: workflow_id.clone(),
                        status: format!("{status:?}"),
                    });
                    continue;
                }
                joined = in_flight.join_next(), if !in_flight.is_empty() => {
                let (step_name, envelope) = joined.expect("join_next polled with no tasks").expect("step task panicked");
                running.remove(&step_name);
                self.emit(WorkflowEvent::StepCompleted {
                    workflow_id: workflow_id.clone(),
                    step_name: step_name.clone(),
                    confidence: envelope.metadata.confidence,
                    quality_score: envelope.metadata.quality_score,
                });

                let action = {
                    let mut state = self.state.write().await;
                    interpret_result(&step_name, &envelope, &mut state, &self.tuning).0
                };

                match action {
                    InterpretAction::Terminate => {
                        let reason = {
                            let state = self.state.read().await;
                            state
                                .step_results
                                .get(&step_name)
                                .and_then(|r| r.issues.iter().find(|i| i.is_critical_non_retryable()))
                                .map(|i| i.message.clone())
                                .unwrap_or_else(|| "terminated".to_string())
                        };
                        self.emit(WorkflowEvent::WorkflowFailed { workflow_id: workflow_id.clone(), reason });
                        return Ok(self.state.read().await.clone());
                    }
                    InterpretAction::Retry => {
                        if let Some(enhanced) = {
                            let state = self.state.read().await;
                            let original = parameters.get(&step_name).cloned().unwrap_or_default();
                            state
                                .step_results
                                .get(&step_name)
                                .and_then(|result| smart_retry(&step_name, result, &original, &state, &self.tuning))
                        } {
                            parameters.insert(step_name.clone(), enhanced.parameters);
                        }
                    }
                    InterpretAction::SkipDownstream | InterpretAction::Proceed => {}
                }

                if self.single_step_mode.load(Ordering::SeqCst) {
                    self.step_advance.notified().await;
                }
                }
            }
        }

        let mut state = self.state.write().await;
        if state.status == WorkflowStatus::Running {
            state.status = WorkflowStatus::Completed;
        }
        self.emit(WorkflowEvent::WorkflowCompleted { workflow_id });
        Ok(state.clone())
    }

    async fn upstream_contexts_for(&self, dependencies: &HashMap<String, Vec<String>>, step_name: &str) -> Vec<UpstreamContext> {
        let state = self.state.read().await;
        let Some(deps) = dependencies.get(step_name) else {
            return Vec::new();
        };
        deps.iter()
            .filter_map(|dep| {
                let result = state.step_results.get(dep)?;
                if result.status != StepStatus::Completed {
                    return None;
                }
                let envelope = result.envelope.as_ref()?;
                Some(UpstreamContext {
                    source_agent: envelope.agent_id.clone(),
                    source_step: dep.clone(),
                    confidence: envelope.metadata.confidence,
                    relevant_issues: UpstreamContext::relevant_issues_from(&envelope.metadata.issues),
                    routing_suggestions: envelope.routing.suggestions.clone(),
                    key_insights: Vec::new(),
                })
            })
            .collect()
    }
}
