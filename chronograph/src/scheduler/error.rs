//! Scheduler error taxonomy. Commit-acquisition errors degrade to an empty plan
//! (§4.3); progress/checkpoint persistence errors are logged, never propagated.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to open repository at {path}: {source}")]
    Repository {
        path: String,
        #[source]
        source: git2::Error,
    },
    #[error("failed to walk commit history: {0}")]
    CommitWalk(#[source] git2::Error),
    #[error("no active plan for repository '{repository}' team '{team}'")]
    NoActivePlan { repository: String, team: String },
    #[error("batch '{0}' not found in the active plan")]
    BatchNotFound(String),
    #[error("batch '{batch_id}' is not pending (status: {status:?})")]
    BatchNotPending {
        batch_id: String,
        status: crate::scheduler::batch::BatchStatus,
    },
}
