//! `LlmRouter`: the black-box inference call `decide_next_steps` escalates to when
//! the ready set is ambiguous (spec §4.4 rule 5, §9). The provider itself is out of
//! scope (spec §1); this is only the seam, mirroring a bare request/response
//! function rather than a chat-message interface.

use super::error::OrchestratorError;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct LlmRoutingDecision {
    pub steps_to_run: Vec<String>,
    pub reasoning: String,
}

#[async_trait]
pub trait LlmRouter: Send + Sync {
    async fn route(
        &self,
        state_summary: Value,
        ready_steps: &[String],
    ) -> Result<LlmRoutingDecision, OrchestratorError>;
}

/// Always fails so tests and degraded deployments can exercise the rule-based
/// fallback path deterministically.
pub struct UnavailableLlmRouter;

#[async_trait]
impl LlmRouter for UnavailableLlmRouter {
    async fn route(
        &self,
        _state_summary: Value,
        _ready_steps: &[String],
    ) -> Result<LlmRoutingDecision, OrchestratorError> {
        Err(OrchestratorError::LlmRouting("no llm router configured".to_string()))
    }
}

/// Test double returning a fixed decision.
pub struct MockLlmRouter {
    pub decision: LlmRoutingDecision,
}

#[async_trait]
impl LlmRouter for MockLlmRouter {
    async fn route(
        &self,
        _state_summary: Value,
        _ready_steps: &[String],
    ) -> Result<LlmRoutingDecision, OrchestratorError> {
        Ok(self.decision.clone())
    }
}
