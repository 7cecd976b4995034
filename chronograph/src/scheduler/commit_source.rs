//! Commit history reading, abstracted behind a trait so planning logic can be tested
//! against an in-memory fake instead of a real repository (grounded on the trait-
//! behind-a-store pattern used for checkpoint/document stores elsewhere in this crate
//! family).

use super::error::ScheduleError;
use chrono::{DateTime, Utc};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub date: DateTime<Utc>,
}

impl Commit {
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }
}

pub trait CommitSource: Send + Sync {
    /// Returns every commit reachable from the repository's current HEAD, oldest
    /// first. `from_commit`, when set, excludes everything at or before it.
    fn commits_oldest_first(&self, from_commit: Option<&str>) -> Result<Vec<Commit>, ScheduleError>;
}

/// Reads real commit history via `git2` (Revwalk + time-sorted, oldest first).
pub struct Git2CommitSource {
    repo_path: std::path::PathBuf,
}

impl Git2CommitSource {
    pub fn new(repo_path: impl AsRef<Path>) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
        }
    }
}

impl CommitSource for Git2CommitSource {
    fn commits_oldest_first(&self, from_commit: Option<&str>) -> Result<Vec<Commit>, ScheduleError> {
        let repo = git2::Repository::open(&self.repo_path).map_err(|source| ScheduleError::Repository {
            path: self.repo_path.display().to_string(),
            source,
        })?;
        let mut revwalk = repo.revwalk().map_err(ScheduleError::CommitWalk)?;
        revwalk.push_head().map_err(ScheduleError::CommitWalk)?;
        revwalk
            .set_sorting(git2::Sort::TIME | git2::Sort::REVERSE)
            .map_err(ScheduleError::CommitWalk)?;

        let mut commits = Vec::new();
        let mut skipping = from_commit.is_some();
        for oid in revwalk {
            let oid = oid.map_err(ScheduleError::CommitWalk)?;
            let commit = repo.find_commit(oid).map_err(ScheduleError::CommitWalk)?;
            let hash = oid.to_string();
            if skipping {
                if Some(hash.as_str()) == from_commit {
                    skipping = false;
                }
                continue;
            }
            let date = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0).unwrap_or_else(Utc::now);
            commits.push(Commit { hash, date });
        }
        Ok(commits)
    }
}

/// Test double: a fixed, already-ordered commit list.
pub struct InMemoryCommitSource {
    commits: Vec<Commit>,
}

impl InMemoryCommitSource {
    pub fn new(commits: Vec<Commit>) -> Self {
        Self { commits }
    }
}

impl CommitSource for InMemoryCommitSource {
    fn commits_oldest_first(&self, from_commit: Option<&str>) -> Result<Vec<Commit>, ScheduleError> {
        match from_commit {
            None => Ok(self.commits.clone()),
            Some(hash) => {
                let position = self.commits.iter().position(|c| c.hash == hash);
                match position {
                    Some(index) => Ok(self.commits[index + 1..].to_vec()),
                    None => Ok(self.commits.clone()),
                }
            }
        }
    }
}
