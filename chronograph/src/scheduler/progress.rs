//! `batch-progress.json`: live snapshot read by the dashboard (spec §4.3).

use super::batch::{BatchStats, BatchWindow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Open string->status map (spec §9 open question): the operator set
/// `{conv, aggr, embed, dedup, pred, merge}` is documented, not strictly typed, to
/// permit later operators.
pub fn default_operator_sub_status() -> HashMap<String, OperatorStatus> {
    ["conv", "aggr", "embed", "dedup", "pred", "merge"]
        .iter()
        .map(|name| (name.to_string(), OperatorStatus::Pending))
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurrentBatchInfo {
    pub batch_id: String,
    pub batch_number: u32,
    pub start_commit_short: String,
    pub end_commit_short: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub current_batch: Option<CurrentBatchInfo>,
    pub completed_count: u32,
    pub total_count: u32,
    pub percent_complete: f64,
    #[serde(default)]
    pub accumulated_stats: Option<BatchStats>,
    pub operator_sub_status: HashMap<String, OperatorStatus>,
    pub last_updated: DateTime<Utc>,
}

impl ProgressSnapshot {
    pub fn from_batches(
        batches: &[BatchWindow],
        current: Option<&BatchWindow>,
        operator_sub_status: HashMap<String, OperatorStatus>,
    ) -> Self {
        let total_count = batches.len() as u32;
        let completed_count = batches
            .iter()
            .filter(|b| b.status == super::batch::BatchStatus::Completed)
            .count() as u32;
        let percent_complete = if total_count == 0 {
            100.0
        } else {
            (completed_count as f64 / total_count as f64) * 100.0
        };
        Self {
            current_batch: current.map(|b| CurrentBatchInfo {
                batch_id: b.id.clone(),
                batch_number: b.batch_number,
                start_commit_short: b.start_commit.chars().take(7).collect(),
                end_commit_short: b.end_commit.chars().take(7).collect(),
            }),
            completed_count,
            total_count,
            percent_complete,
            accumulated_stats: None,
            operator_sub_status,
            last_updated: Utc::now(),
        }
    }

    /// Best-effort write; failures are logged by the caller, never fatal.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self).expect("progress snapshot serializes");
        std::fs::write(path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::batch::BatchStatus;
    use chrono::DateTime;

    fn window(number: u32, status: BatchStatus) -> BatchWindow {
        BatchWindow {
            id: BatchWindow::id_for(number),
            batch_number: number,
            start_commit: "abc1234".to_string(),
            end_commit: "def5678".to_string(),
            start_date: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
            end_date: DateTime::<Utc>::from_timestamp(1, 0).unwrap(),
            commit_count: 1,
            status,
            stats: None,
        }
    }

    #[test]
    fn percent_complete_reflects_completed_fraction() {
        let batches = vec![
            window(1, BatchStatus::Completed),
            window(2, BatchStatus::Pending),
        ];
        let snapshot = ProgressSnapshot::from_batches(&batches, Some(&batches[1]), default_operator_sub_status());
        assert_eq!(snapshot.percent_complete, 50.0);
        assert_eq!(snapshot.operator_sub_status.len(), 6);
    }

    #[test]
    fn empty_plan_is_fully_complete() {
        let snapshot = ProgressSnapshot::from_batches(&[], None, default_operator_sub_status());
        assert_eq!(snapshot.percent_complete, 100.0);
    }
}
