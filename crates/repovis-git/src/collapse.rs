// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Structure collapsing
//!
//! A window is processed as a sequence of explicit state transitions. For each
//! position the previous [`ActiveSet`] and the structures list produce the next
//! active set, the collapsed change list and the closing expansions of every
//! structure that stopped being active. Nothing here touches the repository;
//! file listings for closing expansions are supplied by the caller.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::commit::{FileChange, FileChangeType};
use crate::error::GitError;
use crate::settings::Structure;

/// Structures currently collapsing their folder
///
/// Members are indices into the structures list the set was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    members: BTreeSet<usize>,
}

impl ActiveSet {
    /// An empty active set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruct the state just before `start` without walking earlier commits
    #[must_use]
    pub fn bootstrap(structures: &[Structure], start: usize) -> Self {
        let members = structures
            .iter()
            .enumerate()
            .filter(|(_, s)| s.collapse && s.is_active_before(start))
            .map(|(i, _)| i)
            .collect();
        Self { members }
    }

    /// Check whether the structure at `index` is active
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// Number of active structures
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if no structure is active
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Active structure indices in declaration order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }

    /// Compute the state at `position` from this (previous) state
    #[must_use]
    pub fn transition(&self, structures: &[Structure], position: usize) -> Transition {
        let mut members = self.members.clone();
        let mut closing = Vec::new();

        for (index, structure) in structures.iter().enumerate() {
            let active_now = structure.is_active(position);
            if !self.contains(index) {
                if structure.collapse && active_now {
                    members.insert(index);
                }
            } else if !active_now {
                members.remove(&index);
                closing.push(index);
            }
        }

        Transition {
            active: Self { members },
            closing,
        }
    }

    /// The active structure whose folder contains `path`
    ///
    /// The outermost folder wins; ties go to the earlier declaration.
    #[must_use]
    pub fn owner_of<'s>(&self, structures: &'s [Structure], path: &str) -> Option<&'s Structure> {
        self.iter()
            .filter_map(|index| structures.get(index))
            .filter(|structure| structure.contains(path))
            .min_by_key(|structure| structure.folder_path().len())
    }
}

/// Result of advancing the active set by one position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the transition
    pub active: ActiveSet,
    /// Structures that stopped being active, in declaration order
    pub closing: Vec<usize>,
}

/// Output of processing one commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// State to carry into the next position
    pub active: ActiveSet,
    /// Collapsed changes followed by closing expansions
    pub changes: Vec<FileChange>,
}

/// Rewrite changes that fall under an active structure
///
/// Each affected change takes the path `<folder>/<label>` and is flagged as
/// collapsed. Within one commit only the first change per collapsed path is kept.
#[must_use]
pub fn collapse_changes(
    raw: Vec<FileChange>,
    structures: &[Structure],
    active: &ActiveSet,
) -> Vec<FileChange> {
    if active.is_empty() {
        return raw;
    }

    let mut seen = HashSet::new();
    let mut changes = Vec::with_capacity(raw.len());
    for mut change in raw {
        if let Some(structure) = active.owner_of(structures, &change.path) {
            let path = structure.collapsed_path();
            if !seen.insert(path.clone()) {
                continue;
            }
            change.path = path;
            change.collapsed = true;
        }
        changes.push(change);
    }
    changes
}

/// Process one commit at `position`
///
/// `files_under` lists the files of a structure's folder at this commit and is
/// only called for structures that close here. A listed file that still lies
/// under another active structure is reported as that structure's node instead.
///
/// # Errors
///
/// Propagates any error returned by `files_under`.
pub fn step<F>(
    previous: &ActiveSet,
    structures: &[Structure],
    position: usize,
    raw: Vec<FileChange>,
    mut files_under: F,
) -> Result<Step, GitError>
where
    F: FnMut(&Structure) -> Result<Vec<String>, GitError>,
{
    let Transition { active, closing } = previous.transition(structures, position);

    let mut expansions = Vec::new();
    for structure in closing.iter().filter_map(|&index| structures.get(index)) {
        let files = files_under(structure)?;
        debug!(
            position,
            folder = %structure.folder,
            files = files.len(),
            "Expanding structure"
        );
        expansions.extend(files);
    }

    let mut changes = collapse_changes(raw, structures, &active);
    let mut nodes: HashSet<String> = changes
        .iter()
        .filter(|c| c.collapsed)
        .map(|c| c.path.clone())
        .collect();

    // Files still owned by an active structure reappear as its node
    for file in expansions {
        match active.owner_of(structures, &file) {
            Some(owner) => {
                let node = owner.collapsed_path();
                if nodes.insert(node.clone()) {
                    changes.push(FileChange {
                        change_type: FileChangeType::Added,
                        path: node,
                        collapsed: true,
                    });
                }
            }
            None => changes.push(FileChange::expanded(file)),
        }
    }
    Ok(Step { active, changes })
}
