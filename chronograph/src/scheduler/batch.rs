//! `BatchWindow` and `BatchStats` (spec §3, §4.3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchStats {
    pub commits: u32,
    pub sessions: u32,
    pub tokens_used: u64,
    pub entities_created: u32,
    pub entities_updated: u32,
    pub relations_added: u32,
    #[serde(default)]
    pub operator_stats: HashMap<String, u32>,
    pub duration_ms: u64,
}

/// A contiguous, chronologically-ordered slice of commit history of fixed count
/// (the scheduler's unit of work). Status transitions are monotonic except for an
/// explicit reset (spec §3 invariant).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchWindow {
    /// `"batch-NNN"`, 1-based.
    pub id: String,
    pub batch_number: u32,
    pub start_commit: String,
    pub end_commit: String,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    pub commit_count: u32,
    pub status: BatchStatus,
    #[serde(default)]
    pub stats: Option<BatchStats>,
}

impl BatchWindow {
    pub fn id_for(batch_number: u32) -> String {
        format!("batch-{batch_number:03}")
    }
}
