// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! git2-backed history source
//!
//! This module resolves branches, walks their ancestry and extracts file-level
//! changes using the `git2` crate.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{ObjectType, Oid, Repository, Sort, Tree, TreeWalkMode, TreeWalkResult};
use tracing::debug;

use crate::commit::{FileChange, FileChangeType, Revision};
use crate::error::GitError;
use crate::source::HistorySource;

/// A git repository opened for reading
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        debug!(path = %repo.path().display(), "Opened git repository");
        Ok(Self { repo })
    }

    /// Resolve a branch name, falling back to the `origin` remote-tracking ref
    fn resolve_oid(&self, branch: &str) -> Result<Oid, GitError> {
        let not_found = || GitError::BranchNotFound {
            branch: branch.to_string(),
        };

        let object = self
            .repo
            .revparse_single(branch)
            .or_else(|_| self.repo.revparse_single(&format!("origin/{branch}")))
            .map_err(|_| not_found())?;
        let commit = object.peel_to_commit().map_err(|_| not_found())?;
        Ok(commit.id())
    }

    fn commit_tree(&self, hash: &str) -> Result<Tree<'_>, GitError> {
        let oid = Oid::from_str(hash)?;
        Ok(self.repo.find_commit(oid)?.tree()?)
    }

    /// Every file beneath a tree, with paths prefixed by `base`
    fn list_files(tree: &Tree<'_>, base: &str) -> Result<Vec<String>, GitError> {
        let mut files = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() != Some(ObjectType::Tree) {
                let name = String::from_utf8_lossy(entry.name_bytes());
                files.push(format!("{base}{root}{name}"));
            }
            TreeWalkResult::Ok
        })?;
        Ok(files)
    }
}

/// Convert a git2 commit time to UTC
fn commit_timestamp(commit: &git2::Commit<'_>) -> DateTime<Utc> {
    Utc.timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}

impl HistorySource for GitRepo {
    fn resolve_branch(&self, branch: &str) -> Result<String, GitError> {
        self.resolve_oid(branch).map(|oid| oid.to_string())
    }

    fn walk(&self, tip: &str) -> Result<Vec<Revision>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;
        revwalk.push(Oid::from_str(tip)?)?;

        let mut revisions = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            revisions.push(Revision {
                hash: commit.id().to_string(),
                author: commit.author().name().unwrap_or("Unknown").to_string(),
                timestamp: commit_timestamp(&commit),
                parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            });
        }
        Ok(revisions)
    }

    fn changes(&self, revision: &Revision) -> Result<Vec<FileChange>, GitError> {
        let tree = self.commit_tree(&revision.hash)?;

        let Some(parent) = revision.first_parent() else {
            let files = Self::list_files(&tree, "")?;
            return Ok(files.into_iter().map(FileChange::added).collect());
        };

        let parent_tree = self.commit_tree(parent)?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)?;

        let changes = diff
            .deltas()
            .filter_map(|delta| {
                let change_type = FileChangeType::from_delta(delta.status());
                let file = if change_type == FileChangeType::Deleted {
                    delta.old_file()
                } else {
                    delta.new_file()
                };
                file.path()
                    .map(|path| FileChange::new(change_type, path.to_string_lossy()))
            })
            .collect();
        Ok(changes)
    }

    fn tree_files(&self, hash: &str, folder: Option<&str>) -> Result<Vec<String>, GitError> {
        let tree = self.commit_tree(hash)?;
        let folder = folder.map(|f| f.trim_matches('/')).unwrap_or_default();
        if folder.is_empty() {
            return Self::list_files(&tree, "");
        }

        let entry = match tree.get_path(Path::new(folder)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Tree) {
            return Ok(Vec::new());
        }

        let subtree = self.repo.find_tree(entry.id())?;
        Self::list_files(&subtree, &format!("{folder}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use std::env;

    fn get_repo() -> GitRepo {
        let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
        let found = Repository::discover(manifest_dir).expect("Should discover repo");
        GitRepo::open(found.path()).expect("Should open discovered repo")
    }

    fn in_git_checkout() -> bool {
        env::var("CARGO_MANIFEST_DIR")
            .map(|dir| Repository::discover(dir).is_ok())
            .unwrap_or(false)
    }

    #[test]
    fn test_open_nonexistent_repository() {
        let result = GitRepo::open("/nonexistent/path");
        match result {
            Err(GitError::RepositoryNotFound { path }) => {
                assert!(path.contains("nonexistent"));
            }
            _ => panic!("Expected RepositoryNotFound error"),
        }
    }

    #[test]
    fn test_unknown_branch_is_branch_not_found() {
        if !in_git_checkout() {
            return;
        }
        let repo = get_repo();
        let err = repo.resolve_branch("no-such-branch-12345").unwrap_err();
        assert!(err.is_branch_not_found());
    }

    #[test]
    fn test_head_walk_starts_at_tip() {
        if !in_git_checkout() {
            return;
        }
        let repo = get_repo();
        let tip = repo.resolve_branch("HEAD").expect("Should resolve HEAD");
        assert!(Revision::is_valid_hash(&tip));

        let walked = repo.walk(&tip).expect("Should walk");
        assert_eq!(walked.first().map(|r| r.hash.as_str()), Some(tip.as_str()));
        assert!(walked.iter().all(|r| Revision::is_valid_hash(&r.hash)));
    }
}
