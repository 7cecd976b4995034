//! Orchestrator-level fault taxonomy. Step-level faults live inside envelopes and
//! never reach here (spec §4.4 failure semantics).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("workflow '{0}' references unknown agent id '{1}'")]
    UnknownAgent(String, String),
    #[error("step '{0}' is not part of the workflow")]
    UnknownStep(String),
    #[error("dependency cycle detected involving step '{0}'")]
    CyclicDependency(String),
    #[error("llm routing failed: {0}")]
    LlmRouting(String),
}
