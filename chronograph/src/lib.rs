//! # Chronograph
//!
//! Orchestration core for a multi-agent knowledge-graph construction pipeline: a
//! standard agent envelope, a fixed-phase base agent template, a YAML-driven
//! workflow/agent configuration loader, a chronological batch scheduler, and a
//! smart orchestrator that decides what runs next from agent output alone.
//!
//! ## Main modules
//!
//! - [`envelope`]: the Agent Envelope protocol — [`envelope::AgentResponse`],
//!   [`envelope::ConfidenceBreakdown`], [`envelope::AgentIssue`], [`envelope::AgentRouting`].
//! - [`agent`]: [`agent::Agent`] (domain logic) and [`agent::ExecutableAgent`] (the
//!   envelope-producing contract), [`agent::BaseAgent`] (the six-phase template),
//!   [`agent::LegacyAdapter`], [`agent::AgentRegistry`].
//! - [`workflow`]: [`workflow::ConfigLoader`] — loads and validates `agents.yaml` and
//!   `workflows/*.yaml`, with tuning files for the orchestrator and runner.
//! - [`scheduler`]: [`scheduler::BatchScheduler`] — partitions commit history into
//!   fixed-size batches, checkpoints completion, and reports live progress.
//! - [`orchestrator`]: [`orchestrator::SmartOrchestrator`] — decides the next steps
//!   to run from prior results, retries semantically, and bounds concurrency.
//! - [`config`]: environment-variable readers for batch sizing and storage paths.

pub mod agent;
pub mod config;
pub mod envelope;
pub mod orchestrator;
pub mod scheduler;
pub mod workflow;

pub use agent::{
    Agent, AgentContext, AgentError, AgentRegistry, BaseAgent, ExecutableAgent, LegacyAdapter,
    ProcessOutcome,
};
pub use envelope::{
    has_critical, has_retryable, is_success, needs_escalation, needs_retry, AgentIssue,
    AgentMetadata, AgentResponse, AgentRouting, ConfidenceBreakdown, ConfidenceWeights,
    CorrectionsSummary, IssueCategory, RetryRecommendation, RoutingAction, RoutingSuggestion,
    Severity, UpstreamContext,
};
pub use orchestrator::{OrchestratorError, SmartOrchestrator, WorkflowState, WorkflowStatus};
pub use scheduler::{BatchScheduler, BatchStats, BatchStatus, BatchWindow, PlanRequest, ScheduleError};
pub use workflow::{AgentCatalog, ConfigLoader, LoaderError, WorkflowDefinition, WorkflowValidationError};
