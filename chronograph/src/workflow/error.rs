//! Loader error taxonomy, grounded on the teacher's `CompilationError` style: every
//! fallible boundary is a closed `thiserror` enum, and validation never returns a
//! partial result.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowValidationError {
    #[error("step '{step}' references unknown agent id '{agent_id}'")]
    UnknownAgentId { step: String, agent_id: String },
    #[error("visualization edge references unknown agent id '{agent_id}'")]
    UnknownEdgeEndpoint { agent_id: String },
    #[error("step '{step}' depends on undeclared step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },
    #[error("step '{step}' is declared more than once")]
    DuplicateStep { step: String },
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("workflow definition failed validation: {0:?}")]
    Validation(Vec<WorkflowValidationError>),
}
