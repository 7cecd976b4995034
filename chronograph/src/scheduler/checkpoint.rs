//! `batch-checkpoints.json`: durable record of completed batches (spec §4.3, §6).

use super::batch::BatchStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletedBatchEntry {
    pub batch_id: String,
    pub completed_at: DateTime<Utc>,
    pub stats: BatchStats,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckpointFile {
    pub last_completed_batch: u32,
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_batches: Vec<CompletedBatchEntry>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl CheckpointFile {
    pub fn load(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Best-effort write: failures are logged by the caller, never propagated as a
    /// hard error (spec §4.3 failure semantics).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self).expect("checkpoint serializes");
        std::fs::write(path, text)
    }

    pub fn record_completion(&mut self, batch_id: String, stats: BatchStats, batch_number: u32) {
        let now = Utc::now();
        self.completed_batches.push(CompletedBatchEntry {
            batch_id,
            completed_at: now,
            stats,
        });
        self.last_completed_batch = self.last_completed_batch.max(batch_number);
        self.last_completed_at = Some(now);
        self.last_updated = Some(now);
    }

    /// Reverts to batch `n - 1`, discarding checkpoint entries for batch >= n
    /// (spec §4.3: `resetFromBatch` rolls `lastCompletedBatch` to n-1).
    pub fn reset_from_batch(&mut self, n: u32) {
        self.completed_batches
            .retain(|entry| batch_number_of(&entry.batch_id) < n);
        self.last_completed_batch = n.saturating_sub(1);
        self.last_updated = Some(Utc::now());
    }
}

fn batch_number_of(batch_id: &str) -> u32 {
    batch_id
        .strip_prefix("batch-")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
