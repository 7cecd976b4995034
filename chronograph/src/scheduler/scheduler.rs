//! `BatchScheduler`: imposes chronological order on commit history, persists a plan,
//! and permits resume (spec §4.3).

use super::batch::{BatchStats, BatchStatus, BatchWindow};
use super::checkpoint::CheckpointFile;
use super::commit_source::CommitSource;
use super::error::ScheduleError;
use super::plan::{plan_batches, PlanOptions};
use super::progress::{default_operator_sub_status, ProgressSnapshot};
use std::path::PathBuf;
use std::sync::RwLock;

/// Requests a planning pass. `resume_from_checkpoint`, when true, loads the on-disk
/// checkpoint and marks its completed batches accordingly; the caller never supplies
/// checkpoint *data* directly (that would defeat resuming across process restarts,
/// the whole point of persisting it).
#[derive(Clone, Debug, Default)]
pub struct PlanRequest {
    pub batch_size: u32,
    pub max_batches: Option<u32>,
    pub from_commit: Option<String>,
    pub resume_from_checkpoint: bool,
}

/// One instance per (repository, team) — spec §9 design note: acceptable as a
/// behind-a-registry singleton only given an explicit reset, which here is simply
/// dropping the `BatchScheduler` and constructing a new one.
pub struct BatchScheduler<C: CommitSource> {
    pub repository: String,
    pub team: String,
    source: C,
    checkpoint_path: PathBuf,
    progress_path: PathBuf,
    batches: RwLock<Vec<BatchWindow>>,
    checkpoint: RwLock<CheckpointFile>,
}

impl<C: CommitSource> BatchScheduler<C> {
    pub fn new(
        repository: impl Into<String>,
        team: impl Into<String>,
        source: C,
        state_dir: impl Into<PathBuf>,
    ) -> Self {
        let state_dir = state_dir.into();
        Self {
            repository: repository.into(),
            team: team.into(),
            source,
            checkpoint_path: state_dir.join("batch-checkpoints.json"),
            progress_path: state_dir.join("batch-progress.json"),
            batches: RwLock::new(Vec::new()),
            checkpoint: RwLock::new(CheckpointFile::default()),
        }
    }

    /// Obtains commits, partitions them, and persists the resulting plan. Commit
    /// acquisition failures degrade to an empty plan with a log, never an `Err`
    /// (spec §4.3 failure semantics).
    pub fn plan(&self, request: PlanRequest) {
        let resume = if request.resume_from_checkpoint {
            let checkpoint = CheckpointFile::load(&self.checkpoint_path).unwrap_or_default();
            *self.checkpoint.write().unwrap() = checkpoint.clone();
            Some(checkpoint)
        } else {
            None
        };
        let options = PlanOptions {
            batch_size: request.batch_size,
            max_batches: request.max_batches,
            from_commit: request.from_commit.clone(),
            resume_from_checkpoint: resume,
        };

        let commits = match self.source.commits_oldest_first(options.from_commit.as_deref()) {
            Ok(commits) => commits,
            Err(err) => {
                tracing::warn!(repository = %self.repository, error = %err, "commit acquisition failed; using empty plan");
                Vec::new()
            }
        };
        let windows = plan_batches(&commits, &options);
        *self.batches.write().unwrap() = windows;
        self.persist_progress(None);
    }

    fn persist_progress(&self, current: Option<&BatchWindow>) {
        let batches = self.batches.read().unwrap();
        let snapshot = ProgressSnapshot::from_batches(&batches, current, default_operator_sub_status());
        if let Err(err) = snapshot.save(&self.progress_path) {
            tracing::warn!(error = %err, "failed to persist batch progress snapshot");
        }
    }

    fn persist_checkpoint(&self) {
        let checkpoint = self.checkpoint.read().unwrap();
        if let Err(err) = checkpoint.save(&self.checkpoint_path) {
            tracing::warn!(error = %err, "failed to persist batch checkpoint");
        }
    }

    /// Atomically picks the lowest-numbered pending batch, flips it to `processing`.
    pub fn next_batch(&self) -> Option<BatchWindow> {
        let mut batches = self.batches.write().unwrap();
        let next = batches
            .iter_mut()
            .filter(|b| b.status == BatchStatus::Pending)
            .min_by_key(|b| b.batch_number)?;
        next.status = BatchStatus::Processing;
        let result = next.clone();
        drop(batches);
        self.persist_progress(Some(&result));
        Some(result)
    }

    pub fn complete_batch(&self, batch_id: &str, stats: BatchStats) -> Result<(), ScheduleError> {
        let batch_number = {
            let mut batches = self.batches.write().unwrap();
            let window = batches
                .iter_mut()
                .find(|b| b.id == batch_id)
                .ok_or_else(|| ScheduleError::BatchNotFound(batch_id.to_string()))?;
            window.status = BatchStatus::Completed;
            window.stats = Some(stats.clone());
            window.batch_number
        };
        self.checkpoint
            .write()
            .unwrap()
            .record_completion(batch_id.to_string(), stats, batch_number);
        self.persist_checkpoint();
        self.persist_progress(None);
        Ok(())
    }

    pub fn fail_batch(&self, batch_id: &str) -> Result<(), ScheduleError> {
        let mut batches = self.batches.write().unwrap();
        let window = batches
            .iter_mut()
            .find(|b| b.id == batch_id)
            .ok_or_else(|| ScheduleError::BatchNotFound(batch_id.to_string()))?;
        window.status = BatchStatus::Failed;
        drop(batches);
        self.persist_progress(None);
        Ok(())
    }

    /// Reverts every batch numbered >= n back to `pending`, discards their stats,
    /// and rolls the checkpoint's `last_completed_batch` back to n-1.
    pub fn reset_from_batch(&self, n: u32) {
        let mut batches = self.batches.write().unwrap();
        for batch in batches.iter_mut() {
            if batch.batch_number >= n {
                batch.status = BatchStatus::Pending;
                batch.stats = None;
            }
        }
        drop(batches);
        self.checkpoint.write().unwrap().reset_from_batch(n);
        self.persist_checkpoint();
        self.persist_progress(None);
    }

    pub fn batches(&self) -> Vec<BatchWindow> {
        self.batches.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::commit_source::{Commit, InMemoryCommitSource};
    use chrono::{DateTime, Utc};

    fn commits(n: usize) -> Vec<Commit> {
        (0..n)
            .map(|i| Commit {
                hash: format!("c{i}"),
                date: DateTime::<Utc>::from_timestamp(i as i64, 0).unwrap(),
            })
            .collect()
    }

    fn scheduler(n: usize, batch_size: u32, dir: &std::path::Path) -> BatchScheduler<InMemoryCommitSource> {
        let scheduler = BatchScheduler::new(
            "acme/repo",
            "platform",
            InMemoryCommitSource::new(commits(n)),
            dir,
        );
        scheduler.plan(PlanRequest {
            batch_size,
            ..Default::default()
        });
        scheduler
    }

    /// **Scenario**: `next_batch` always returns the lowest-numbered pending batch,
    /// and flips it to `processing` so a second call does not return it again.
    #[test]
    fn next_batch_picks_lowest_pending_and_flips_to_processing() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler(6, 2, dir.path());
        let first = scheduler.next_batch().unwrap();
        assert_eq!(first.batch_number, 1);
        let second = scheduler.next_batch().unwrap();
        assert_eq!(second.batch_number, 2);
    }

    /// **Scenario**: completing a batch updates its status and appends a checkpoint
    /// entry; the checkpoint file on disk reflects it.
    #[test]
    fn complete_batch_persists_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler(4, 2, dir.path());
        let batch = scheduler.next_batch().unwrap();
        scheduler
            .complete_batch(
                &batch.id,
                BatchStats {
                    commits: 2,
                    sessions: 1,
                    tokens_used: 10,
                    entities_created: 1,
                    entities_updated: 0,
                    relations_added: 0,
                    operator_stats: Default::default(),
                    duration_ms: 5,
                },
            )
            .unwrap();
        let checkpoint = CheckpointFile::load(&dir.path().join("batch-checkpoints.json")).unwrap();
        assert_eq!(checkpoint.last_completed_batch, 1);
    }

    /// **Scenario**: re-planning with `resumeFromCheckpoint=true` marks prior
    /// batches completed and `next_batch` yields the first pending one after them
    /// (spec §8 scenario 5).
    #[test]
    fn resumes_from_checkpoint_and_yields_next_pending_batch() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler(10, 2, dir.path());
        for _ in 0..2 {
            let batch = scheduler.next_batch().unwrap();
            scheduler
                .complete_batch(
                    &batch.id,
                    BatchStats {
                        commits: 2,
                        sessions: 0,
                        tokens_used: 0,
                        entities_created: 0,
                        entities_updated: 0,
                        relations_added: 0,
                        operator_stats: Default::default(),
                        duration_ms: 0,
                    },
                )
                .unwrap();
        }

        let resumed = BatchScheduler::new(
            "acme/repo",
            "platform",
            InMemoryCommitSource::new(commits(10)),
            dir.path(),
        );
        resumed.plan(PlanRequest {
            batch_size: 2,
            resume_from_checkpoint: true,
            ..Default::default()
        });
        let batches = resumed.batches();
        assert_eq!(batches[0].status, BatchStatus::Completed);
        assert_eq!(batches[1].status, BatchStatus::Completed);
        assert_eq!(batches[2].status, BatchStatus::Pending);
        let next = resumed.next_batch().unwrap();
        assert_eq!(next.batch_number, 3);
    }

    #[test]
    fn reset_from_batch_reverts_later_batches_to_pending() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler(10, 2, dir.path());
        for _ in 0..3 {
            let batch = scheduler.next_batch().unwrap();
            scheduler
                .complete_batch(
                    &batch.id,
                    BatchStats {
                        commits: 2,
                        sessions: 0,
                        tokens_used: 0,
                        entities_created: 0,
                        entities_updated: 0,
                        relations_added: 0,
                        operator_stats: Default::default(),
                        duration_ms: 0,
                    },
                )
                .unwrap();
        }
        scheduler.reset_from_batch(2);
        let batches = scheduler.batches();
        assert_eq!(batches[0].status, BatchStatus::Completed);
        assert_eq!(batches[1].status, BatchStatus::Pending);
        assert!(batches[1].stats.is_none());
    }

    #[test]
    fn empty_repository_yields_empty_plan_and_no_next_batch() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler(0, 10, dir.path());
        assert!(scheduler.batches().is_empty());
        assert!(scheduler.next_batch().is_none());
    }
}
