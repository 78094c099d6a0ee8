// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for repovis-git

use thiserror::Error;

/// Errors that can occur while reading repository history
///
/// Every variant aborts the current request; there is no partial result.
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// The branch name does not resolve to a commit
    #[error("Branch not found: {branch}")]
    BranchNotFound {
        /// The branch name that could not be resolved
        branch: String,
    },

    /// Failure while walking history, diffing, or enumerating a tree
    #[error("Unable to traverse repository: {0}")]
    Traverse(#[from] git2::Error),
}

impl GitError {
    /// Whether this error means the requested branch does not exist
    #[must_use]
    pub fn is_branch_not_found(&self) -> bool {
        matches!(self, Self::BranchNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_not_found_message() {
        let err = GitError::BranchNotFound {
            branch: "feature/x".to_string(),
        };
        assert_eq!(err.to_string(), "Branch not found: feature/x");
        assert!(err.is_branch_not_found());
    }

    #[test]
    fn test_traverse_from_git2() {
        let err: GitError = git2::Error::from_str("object missing").into();
        assert!(matches!(err, GitError::Traverse(_)));
        assert!(!err.is_branch_not_found());
        assert!(err.to_string().contains("object missing"));
    }
}
