//! Base Agent: the fixed six-phase template every concrete agent runs through to
//! produce a standard envelope (spec §4.1), plus the legacy-function adapter and
//! the agent-id registry (spec §9: agents are dispatched via a tagged variant, never
//! inheritance).

pub mod base;
pub mod error;
pub mod legacy;
pub mod registry;

use crate::envelope::{AgentIssue, AgentResponse, CorrectionsSummary, RoutingSuggestion};
use crate::envelope::UpstreamContext;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use base::BaseAgent;
pub use error::AgentError;
pub use legacy::LegacyAdapter;
pub use registry::{AgentId, AgentRegistry};

/// Invocation context passed to every agent: upstream context and the current
/// retry attempt (0 on the first attempt).
#[derive(Clone, Debug, Default)]
pub struct AgentContext {
    pub upstream_contexts: Vec<UpstreamContext>,
    pub retry_attempt: u32,
    pub parameters: Map<String, Value>,
}

impl AgentContext {
    pub fn has_upstream_critical(&self) -> bool {
        self.upstream_contexts
            .iter()
            .flat_map(|u| &u.relevant_issues)
            .any(AgentIssue::is_critical_non_retryable)
            || self
                .upstream_contexts
                .iter()
                .flat_map(|u| &u.relevant_issues)
                .any(|i| i.severity == crate::envelope::Severity::Critical)
    }
}

/// What a concrete agent's domain logic produces, before the base template wraps it
/// into an envelope. This is the only type a concrete agent needs to know about.
#[derive(Clone, Debug, Default)]
pub struct ProcessOutcome {
    pub data: Option<Value>,
    pub data_completeness: Option<f64>,
    pub semantic_coherence: Option<f64>,
    pub external_validation: Option<f64>,
    pub processing_quality: Option<f64>,
    pub issues: Vec<AgentIssue>,
    pub suggestions: Vec<RoutingSuggestion>,
    pub suggested_next_steps: Vec<String>,
    pub skip_recommendations: Vec<String>,
    pub corrections: Option<CorrectionsSummary>,
    pub model_id: Option<String>,
    pub token_count: Option<u64>,
}

impl ProcessOutcome {
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }
}

/// One domain-specific operation. Concrete agents (git reader, semantic analyzer, ...)
/// are out of scope here; this trait is their contract. Dispatch happens only through
/// [`AgentRegistry`] by [`AgentId`] — agents never hold a pointer to orchestrator state.
#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> &str;

    async fn process(
        &self,
        input: Value,
        context: &AgentContext,
    ) -> Result<ProcessOutcome, AgentError>;
}

/// Every agent (base-wrapped or legacy-adapted) exposes this single operation.
#[async_trait]
pub trait ExecutableAgent: Send + Sync {
    async fn execute(&self, input: Value, context: &AgentContext, step_name: &str) -> AgentResponse;
}
