// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Source-control provider seam
//!
//! The window builder and the metadata resolver only talk to history through
//! [`HistorySource`]. [`crate::GitRepo`] is the git2 implementation;
//! [`MemoryHistory`] keeps whole snapshots in memory and serves tests and
//! benchmarks.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::commit::{FileChange, Revision};
use crate::error::GitError;

/// Read-only access to a repository's history
pub trait HistorySource {
    /// Resolve a branch name to the hash of its tip commit
    ///
    /// # Errors
    ///
    /// Returns `GitError::BranchNotFound` if the name does not resolve.
    fn resolve_branch(&self, branch: &str) -> Result<String, GitError>;

    /// Walk the ancestry of a commit, newest first
    ///
    /// # Errors
    ///
    /// Returns `GitError::Traverse` on any read failure.
    fn walk(&self, tip: &str) -> Result<Vec<Revision>, GitError>;

    /// Raw file changes of a revision against its first parent
    ///
    /// A root revision reports every file of its tree as added.
    ///
    /// # Errors
    ///
    /// Returns `GitError::Traverse` on any read failure.
    fn changes(&self, revision: &Revision) -> Result<Vec<FileChange>, GitError>;

    /// Paths of every file in a commit's tree, optionally restricted to a folder
    ///
    /// A folder missing from the tree yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `GitError::Traverse` on any read failure.
    fn tree_files(&self, hash: &str, folder: Option<&str>) -> Result<Vec<String>, GitError>;
}

#[derive(Debug, Clone)]
struct Snapshot {
    revision: Revision,
    files: BTreeMap<String, String>,
}

/// An in-memory, linear history built from whole-tree snapshots
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    branches: HashMap<String, String>,
    snapshots: HashMap<String, Snapshot>,
    next_id: u64,
}

impl MemoryHistory {
    /// Create an empty history with no branches
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit to `branch` whose tree is exactly `files` (path, content)
    ///
    /// Returns the generated commit hash.
    pub fn commit<I, P, C>(&mut self, branch: &str, author: &str, files: I) -> String
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        self.next_id += 1;
        let hash = format!("{:040x}", self.next_id);
        let parents = self.branches.get(branch).cloned().into_iter().collect();
        let seconds = 1_700_000_000 + i64::try_from(self.next_id).unwrap_or(i64::MAX) * 60;

        let revision = Revision {
            hash: hash.clone(),
            author: author.to_string(),
            timestamp: DateTime::from_timestamp(seconds, 0).unwrap_or_else(Utc::now),
            parents,
        };
        let files = files
            .into_iter()
            .map(|(path, content)| (path.into(), content.into()))
            .collect();

        self.snapshots
            .insert(hash.clone(), Snapshot { revision, files });
        self.branches.insert(branch.to_string(), hash.clone());
        hash
    }

    fn snapshot(&self, hash: &str) -> Result<&Snapshot, GitError> {
        self.snapshots.get(hash).ok_or_else(|| {
            GitError::Traverse(git2::Error::from_str(&format!("unknown commit {hash}")))
        })
    }
}

impl HistorySource for MemoryHistory {
    fn resolve_branch(&self, branch: &str) -> Result<String, GitError> {
        self.branches
            .get(branch)
            .cloned()
            .ok_or_else(|| GitError::BranchNotFound {
                branch: branch.to_string(),
            })
    }

    fn walk(&self, tip: &str) -> Result<Vec<Revision>, GitError> {
        let mut revisions = Vec::new();
        let mut next = Some(tip.to_string());
        while let Some(hash) = next {
            let snapshot = self.snapshot(&hash)?;
            next = snapshot.revision.first_parent().map(str::to_string);
            revisions.push(snapshot.revision.clone());
        }
        Ok(revisions)
    }

    fn changes(&self, revision: &Revision) -> Result<Vec<FileChange>, GitError> {
        let current = &self.snapshot(&revision.hash)?.files;
        let Some(parent) = revision.first_parent() else {
            return Ok(current.keys().map(FileChange::added).collect());
        };
        let previous = &self.snapshot(parent)?.files;

        let mut changes = Vec::new();
        for (path, content) in current {
            match previous.get(path) {
                None => changes.push(FileChange::added(path)),
                Some(old) if old != content => changes.push(FileChange::modified(path)),
                Some(_) => {}
            }
        }
        for path in previous.keys() {
            if !current.contains_key(path) {
                changes.push(FileChange::deleted(path));
            }
        }
        Ok(changes)
    }

    fn tree_files(&self, hash: &str, folder: Option<&str>) -> Result<Vec<String>, GitError> {
        let files = &self.snapshot(hash)?.files;
        let prefix = folder.map(|f| format!("{}/", f.trim_matches('/')));
        Ok(files
            .keys()
            .filter(|path| prefix.as_deref().is_none_or(|p| path.starts_with(p)))
            .cloned()
            .collect())
    }
}
