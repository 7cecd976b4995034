//! Errors an agent's domain-specific `process` call may return.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent execution failed: {0}")]
    Execution(String),
    #[error("agent input validation failed: {0}")]
    InvalidInput(String),
    #[error("external service call failed: {0}")]
    ExternalService(String),
    #[error("agent timed out after {0}ms")]
    Timeout(u64),
}
