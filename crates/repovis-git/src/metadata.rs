// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Resolution of settings hashes to commit positions
//!
//! Milestones and structure boundaries reference commits by hash. One pass over
//! the branch, newest first, writes the canonical position of every referenced
//! commit into the settings. Entries whose hash is not on the branch are logged
//! and removed; they never fail the request.

use std::collections::{BTreeSet, HashMap};

use tracing::{info, warn};

use crate::error::GitError;
use crate::history::History;
use crate::settings::{RepositoryMetadata, Settings};
use crate::source::HistorySource;

/// Which field a hash resolves into
#[derive(Debug, Clone, Copy)]
enum Target {
    Milestone(usize),
    StructureStart(usize),
    StructureEnd(usize),
}

/// Entries removed from a settings document during resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Hashes of milestones that could not be placed
    pub dropped_milestones: Vec<String>,
    /// Folders of structures that could not be placed
    pub dropped_structures: Vec<String>,
}

impl Resolution {
    /// Check if every entry resolved
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.dropped_milestones.is_empty() && self.dropped_structures.is_empty()
    }
}

fn lookup_table(settings: &Settings) -> HashMap<String, Vec<Target>> {
    let mut lookup: HashMap<String, Vec<Target>> = HashMap::new();
    for (index, milestone) in settings.milestones.iter().enumerate() {
        lookup
            .entry(milestone.commit_hash.clone())
            .or_default()
            .push(Target::Milestone(index));
    }
    for (index, structure) in settings.structures.iter().enumerate() {
        if let Some(hash) = &structure.start_commit_hash {
            lookup
                .entry(hash.clone())
                .or_default()
                .push(Target::StructureStart(index));
        }
        if let Some(hash) = &structure.end_commit_hash {
            lookup
                .entry(hash.clone())
                .or_default()
                .push(Target::StructureEnd(index));
        }
    }
    lookup
}

/// Write the position of every referenced commit into `settings`
///
/// Unresolvable milestones are removed. Structures are removed when a
/// boundary does not resolve, when they start after they end, or when their
/// folder is empty.
pub fn resolve_settings(history: &History, settings: &mut Settings) -> Resolution {
    let mut lookup = lookup_table(settings);

    for (position, revision) in history.newest_first() {
        if lookup.is_empty() {
            break;
        }
        let Some(targets) = lookup.remove(&revision.hash) else {
            continue;
        };
        for target in targets {
            match target {
                Target::Milestone(i) => settings.milestones[i].commit_id = Some(position),
                Target::StructureStart(i) => {
                    settings.structures[i].start_commit_id = Some(position);
                }
                Target::StructureEnd(i) => settings.structures[i].end_commit_id = Some(position),
            }
        }
    }

    let mut stale_milestones = BTreeSet::new();
    let mut stale_structures = BTreeSet::new();
    for (hash, targets) in &lookup {
        warn!(commit_hash = %hash, "Commit hash does not exist on branch");
        for target in targets {
            match *target {
                Target::Milestone(i) => {
                    stale_milestones.insert(i);
                }
                Target::StructureStart(i) | Target::StructureEnd(i) => {
                    stale_structures.insert(i);
                }
            }
        }
    }

    for (index, structure) in settings.structures.iter().enumerate() {
        if structure.folder_path().is_empty() {
            warn!(label = %structure.label, "Structure has no folder");
            stale_structures.insert(index);
            continue;
        }
        if let (Some(start), Some(end)) = (structure.start_commit_id, structure.end_commit_id) {
            if start > end {
                warn!(
                    folder = %structure.folder,
                    start,
                    end,
                    "Structure starts after it ends"
                );
                stale_structures.insert(index);
            }
        }
    }

    let mut resolution = Resolution::default();
    settings.milestones = std::mem::take(&mut settings.milestones)
        .into_iter()
        .enumerate()
        .filter_map(|(i, milestone)| {
            if stale_milestones.contains(&i) {
                resolution.dropped_milestones.push(milestone.commit_hash);
                None
            } else {
                Some(milestone)
            }
        })
        .collect();
    settings.structures = std::mem::take(&mut settings.structures)
        .into_iter()
        .enumerate()
        .filter_map(|(i, structure)| {
            if stale_structures.contains(&i) {
                resolution.dropped_structures.push(structure.folder);
                None
            } else {
                Some(structure)
            }
        })
        .collect();
    resolution
}

/// Summarise a branch and resolve its settings
///
/// # Errors
///
/// Returns `GitError::BranchNotFound` if the branch does not resolve, or
/// `GitError::Traverse` if the walk fails.
pub fn repository_metadata<S: HistorySource + ?Sized>(
    source: &S,
    url: &str,
    branch: &str,
    mut settings: Option<Settings>,
) -> Result<RepositoryMetadata, GitError> {
    let history = History::load(source, branch)?;

    if let Some(settings) = settings.as_mut() {
        let resolution = resolve_settings(&history, settings);
        info!(
            milestones = settings.milestones.len(),
            structures = settings.structures.len(),
            dropped = resolution.dropped_milestones.len() + resolution.dropped_structures.len(),
            "Resolved settings"
        );
    }

    Ok(RepositoryMetadata {
        url: url.to_string(),
        branch: branch.to_string(),
        total_commits: history.len(),
        settings,
    })
}
