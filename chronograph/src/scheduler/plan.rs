//! Batch planning: partitions an oldest-first commit list into fixed-count,
//! contiguous, non-overlapping `BatchWindow`s (spec §4.3, §8 invariant 4).

use super::batch::{BatchStatus, BatchWindow};
use super::checkpoint::CheckpointFile;
use super::commit_source::Commit;

/// Options controlling one planning pass.
#[derive(Clone, Debug, Default)]
pub struct PlanOptions {
    pub batch_size: u32,
    pub max_batches: Option<u32>,
    pub from_commit: Option<String>,
    pub resume_from_checkpoint: Option<CheckpointFile>,
}

/// Slices `commits` (already oldest-first) into contiguous groups of `batch_size`.
/// When resuming, batches numbered <= the checkpoint's last-completed batch are
/// marked `completed` with no stats; the rest are `pending`. `max_batches` caps the
/// **pending** count, not the total (spec §4.3).
pub fn plan_batches(commits: &[Commit], options: &PlanOptions) -> Vec<BatchWindow> {
    if commits.is_empty() || options.batch_size == 0 {
        return Vec::new();
    }

    let last_completed_batch = options
        .resume_from_checkpoint
        .as_ref()
        .map(|c| c.last_completed_batch)
        .unwrap_or(0);

    let mut windows = Vec::new();
    let mut pending_count = 0u32;
    for (index, chunk) in commits.chunks(options.batch_size as usize).enumerate() {
        let batch_number = (index as u32) + 1;
        let status = if batch_number <= last_completed_batch {
            BatchStatus::Completed
        } else {
            if let Some(max) = options.max_batches {
                if pending_count >= max {
                    break;
                }
            }
            pending_count += 1;
            BatchStatus::Pending
        };
        let first = chunk.first().unwrap();
        let last = chunk.last().unwrap();
        windows.push(BatchWindow {
            id: BatchWindow::id_for(batch_number),
            batch_number,
            start_commit: first.hash.clone(),
            end_commit: last.hash.clone(),
            start_date: first.date,
            end_date: last.date,
            commit_count: chunk.len() as u32,
            status,
            stats: None,
        });
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn commits(n: usize) -> Vec<Commit> {
        (0..n)
            .map(|i| Commit {
                hash: format!("c{i}"),
                date: DateTime::<Utc>::from_timestamp(i as i64, 0).unwrap(),
            })
            .collect()
    }

    #[test]
    fn partitions_into_contiguous_fixed_size_batches() {
        let windows = plan_batches(
            &commits(5),
            &PlanOptions {
                batch_size: 2,
                ..Default::default()
            },
        );
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].commit_count, 2);
        assert_eq!(windows[2].commit_count, 1);
        assert_eq!(windows[0].batch_number, 1);
        assert_eq!(windows[1].batch_number, 2);
    }

    #[test]
    fn empty_repository_yields_zero_batches() {
        assert!(plan_batches(&[], &PlanOptions {
            batch_size: 10,
            ..Default::default()
        })
        .is_empty());
    }

    #[test]
    fn resume_marks_prior_batches_completed_without_stats() {
        let checkpoint = CheckpointFile {
            last_completed_batch: 2,
            ..Default::default()
        };
        let windows = plan_batches(
            &commits(10),
            &PlanOptions {
                batch_size: 2,
                resume_from_checkpoint: Some(checkpoint),
                ..Default::default()
            },
        );
        assert_eq!(windows[0].status, BatchStatus::Completed);
        assert_eq!(windows[1].status, BatchStatus::Completed);
        assert!(windows[0].stats.is_none());
        assert_eq!(windows[2].status, BatchStatus::Pending);
    }

    #[test]
    fn max_batches_caps_pending_not_total() {
        let checkpoint = CheckpointFile {
            last_completed_batch: 1,
            ..Default::default()
        };
        let windows = plan_batches(
            &commits(10),
            &PlanOptions {
                batch_size: 2,
                max_batches: Some(1),
                resume_from_checkpoint: Some(checkpoint),
                ..Default::default()
            },
        );
        // batch 1 completed (not counted against the cap) + 1 pending batch.
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].status, BatchStatus::Completed);
        assert_eq!(windows[1].status, BatchStatus::Pending);
    }

    #[test]
    fn planning_twice_is_idempotent() {
        let opts = PlanOptions {
            batch_size: 3,
            ..Default::default()
        };
        let first = plan_batches(&commits(7), &opts);
        let second = plan_batches(&commits(7), &opts);
        assert_eq!(
            first.iter().map(|w| (w.id.clone(), w.start_commit.clone(), w.end_commit.clone())).collect::<Vec<_>>(),
            second.iter().map(|w| (w.id.clone(), w.start_commit.clone(), w.end_commit.clone())).collect::<Vec<_>>(),
        );
    }
}
