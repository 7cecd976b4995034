//! Smart Orchestrator: owns one workflow run, decides what runs next from agent
//! output alone, performs semantically-guided retries, and interprets every
//! envelope into a gate decision (spec §4.4, §5, §9).

pub mod decide;
pub mod error;
pub mod interpret;
pub mod llm_router;
pub mod orchestrator;
pub mod retry;
pub mod state;

pub use decide::{decide_next_steps, DecideNextStepsResult};
pub use error::OrchestratorError;
pub use interpret::{interpret_result, InterpretAction};
pub use llm_router::{LlmRouter, LlmRoutingDecision, MockLlmRouter, UnavailableLlmRouter};
pub use orchestrator::SmartOrchestrator;
pub use retry::{smart_retry, EnhancedParameters, RetryExample, RetryGuidance};
pub use state::{
    ModificationKind, RetryHistory, RoutingDecision, RoutingDecisionAction, StepResult, StepStatus,
    WorkflowModification, WorkflowState, WorkflowStatus,
};
