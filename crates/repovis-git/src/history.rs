// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Canonical commit positions for a branch
//!
//! Position 0 is the oldest commit on the branch and the tip has position
//! `len() - 1`. Windows and resolved settings both index into this numbering.

use std::ops::Range;

use tracing::debug;

use crate::commit::Revision;
use crate::error::GitError;
use crate::source::HistorySource;

/// The full ancestry of a branch, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    revisions: Vec<Revision>,
}

impl History {
    /// Resolve `branch` and index its full ancestry
    ///
    /// # Errors
    ///
    /// Returns `GitError::BranchNotFound` if the branch does not resolve, or
    /// `GitError::Traverse` if the walk fails.
    pub fn load<S: HistorySource + ?Sized>(source: &S, branch: &str) -> Result<Self, GitError> {
        let tip = source.resolve_branch(branch)?;
        let history = Self::from_newest_first(source.walk(&tip)?);
        debug!(branch, tip = %tip, commits = history.len(), "Indexed branch history");
        Ok(history)
    }

    /// Build from a walk in its native, newest-first order
    #[must_use]
    pub fn from_newest_first(mut revisions: Vec<Revision>) -> Self {
        revisions.reverse();
        Self { revisions }
    }

    /// Number of commits on the branch
    #[must_use]
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Check if the branch has no commits
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// The revision at a position
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Revision> {
        self.revisions.get(position)
    }

    /// The position of a commit hash, if it is on the branch
    #[must_use]
    pub fn position_of(&self, hash: &str) -> Option<usize> {
        self.revisions.iter().position(|r| r.hash == hash)
    }

    /// Revisions with their positions, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &Revision)> {
        self.revisions.iter().enumerate()
    }

    /// Revisions with their positions, newest first
    pub fn newest_first(&self) -> impl Iterator<Item = (usize, &Revision)> {
        self.iter().rev()
    }

    /// Positions covered by a window, clipped to the branch length
    ///
    /// A start at or past the end yields an empty range.
    #[must_use]
    pub fn window(&self, start: usize, count: usize) -> Range<usize> {
        let start = start.min(self.len());
        let end = start.saturating_add(count).min(self.len());
        start..end
    }
}
