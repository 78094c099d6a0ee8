// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Windowed commit extraction
//!
//! Builds the annotated commits for a contiguous range of positions. Structure
//! state is rebuilt from the structures list on every call, so two requests
//! over the same positions always agree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collapse::{self, ActiveSet};
use crate::commit::Commit;
use crate::error::GitError;
use crate::history::History;
use crate::settings::Structure;
use crate::source::HistorySource;

/// Commits returned when the caller does not say how many
pub const DEFAULT_COMMIT_COUNT: usize = 50;

/// Commits of a window keyed by position
pub type CommitWindow = BTreeMap<usize, Commit>;

/// A range of positions to materialise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRequest {
    /// First position of the window
    pub start_commit: usize,
    /// Maximum number of commits in the window
    pub commit_count: usize,
}

impl Default for WindowRequest {
    fn default() -> Self {
        Self {
            start_commit: 0,
            commit_count: DEFAULT_COMMIT_COUNT,
        }
    }
}

impl WindowRequest {
    /// Create a window request
    #[must_use]
    pub fn new(start_commit: usize, commit_count: usize) -> Self {
        Self {
            start_commit,
            commit_count,
        }
    }
}

/// Build the commits of a window on `branch`
///
/// A start at or beyond the end of history yields an empty window.
///
/// # Errors
///
/// Returns `GitError::BranchNotFound` if the branch does not resolve, or
/// `GitError::Traverse` on any read failure.
pub fn build_window<S: HistorySource + ?Sized>(
    source: &S,
    branch: &str,
    structures: &[Structure],
    request: WindowRequest,
) -> Result<CommitWindow, GitError> {
    let history = History::load(source, branch)?;
    let window = window_from_history(source, &history, structures, request)?;
    info!(
        branch,
        start = request.start_commit,
        requested = request.commit_count,
        returned = window.len(),
        "Built commit window"
    );
    Ok(window)
}

/// Build the commits of a window over an already indexed history
///
/// # Errors
///
/// Returns `GitError::Traverse` on any read failure.
pub fn window_from_history<S: HistorySource + ?Sized>(
    source: &S,
    history: &History,
    structures: &[Structure],
    request: WindowRequest,
) -> Result<CommitWindow, GitError> {
    let range = history.window(request.start_commit, request.commit_count);
    let mut window = CommitWindow::new();
    if range.is_empty() {
        return Ok(window);
    }

    let mut active = ActiveSet::bootstrap(structures, range.start);
    debug!(start = range.start, active = active.len(), "Seeded structures");

    for position in range {
        let Some(revision) = history.get(position) else {
            break;
        };
        let raw = source.changes(revision)?;
        let step = collapse::step(&active, structures, position, raw, |structure| {
            source.tree_files(&revision.hash, Some(structure.folder_path()))
        })?;
        active = step.active;
        window.insert(
            position,
            Commit::from_revision(position, revision, step.changes),
        );
    }
    Ok(window)
}
