//! Workflow & Agent Configuration Loader (spec §4.2): authoritative YAML as the
//! single source of truth for both execution and visualization.

pub mod catalog;
pub mod definition;
pub mod error;
pub mod loader;
pub mod tuning;

pub use catalog::{AgentCatalog, AgentCatalogEntry, LifecyclePhase};
pub use definition::{GlobalConfig, StepDefinition, StepTier, VisualizationEdge, WorkflowDefinition, WorkflowType};
pub use error::{LoaderError, WorkflowValidationError};
pub use loader::{validate_workflow, ConfigLoader};
pub use tuning::{AgentTuning, OrchestratorTuning, WorkflowRunnerTuning};
