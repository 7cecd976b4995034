//! Batch scheduling: chronological commit-history partitioning, checkpointing, and
//! live progress reporting (spec §4.3).

pub mod batch;
pub mod checkpoint;
pub mod commit_source;
pub mod error;
pub mod plan;
pub mod progress;
pub mod scheduler;

pub use batch::{BatchStats, BatchStatus, BatchWindow};
pub use checkpoint::{CheckpointFile, CompletedBatchEntry};
pub use commit_source::{Commit, CommitSource, Git2CommitSource, InMemoryCommitSource};
pub use error::ScheduleError;
pub use plan::{plan_batches, PlanOptions};
pub use progress::{default_operator_sub_status, CurrentBatchInfo, OperatorStatus, ProgressSnapshot};
pub use scheduler::{BatchScheduler, PlanRequest};
