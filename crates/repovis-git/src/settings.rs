// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! User-authored visualisation settings
//!
//! Settings documents arrive with commit hashes only. The resolver in
//! [`crate::metadata`] fills in the matching positions.

use serde::{Deserialize, Serialize};

/// A folder that renders as a single node between two points in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    /// Repository-relative folder collapsed by this structure
    pub folder: String,
    /// Label of the synthetic node, rendered as `<folder>/<label>`
    pub label: String,
    /// Commit at which the structure starts collapsing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_commit_hash: Option<String>,
    /// Commit at which the structure stops collapsing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_commit_hash: Option<String>,
    /// Resolved position of the start commit
    #[serde(
        rename = "startCommitID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_commit_id: Option<usize>,
    /// Resolved position of the end commit
    #[serde(
        rename = "endCommitID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub end_commit_id: Option<usize>,
    /// Whether the structure collapses its folder while active
    #[serde(default)]
    pub collapse: bool,
}

impl Structure {
    /// Create an unbounded, non-collapsing structure
    #[must_use]
    pub fn new(folder: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            label: label.into(),
            start_commit_hash: None,
            end_commit_hash: None,
            start_commit_id: None,
            end_commit_id: None,
            collapse: false,
        }
    }

    /// Enable collapsing
    #[must_use]
    pub fn collapsing(mut self) -> Self {
        self.collapse = true;
        self
    }

    /// Set the boundary hashes
    #[must_use]
    pub fn with_hashes(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.start_commit_hash = start.map(str::to_string);
        self.end_commit_hash = end.map(str::to_string);
        self
    }

    /// Set already-resolved boundary positions
    #[must_use]
    pub fn with_positions(mut self, start: Option<usize>, end: Option<usize>) -> Self {
        self.start_commit_id = start;
        self.end_commit_id = end;
        self
    }

    /// Whether the structure is active at a position
    ///
    /// Active over `[start, end)`; a missing bound is open-ended.
    #[must_use]
    pub fn is_active(&self, position: usize) -> bool {
        self.start_commit_id.is_none_or(|start| position >= start)
            && self.end_commit_id.is_none_or(|end| position < end)
    }

    /// Whether the structure is active just before `position`
    ///
    /// Before the first commit only structures without a start bound are active.
    #[must_use]
    pub fn is_active_before(&self, position: usize) -> bool {
        match position.checked_sub(1) {
            Some(previous) => self.is_active(previous),
            None => self.start_commit_id.is_none(),
        }
    }

    /// The folder without leading or trailing separators
    #[must_use]
    pub fn folder_path(&self) -> &str {
        self.folder.trim_matches('/')
    }

    /// Path of the synthetic node replacing the folder's contents
    #[must_use]
    pub fn collapsed_path(&self) -> String {
        format!("{}/{}", self.folder_path(), self.label)
    }

    /// Whether a repository path lies within the folder
    ///
    /// A structure without a folder contains nothing.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        let folder = self.folder_path();
        if folder.is_empty() {
            return false;
        }
        path.strip_prefix(folder)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// A labelled point in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Hash of the commit the milestone marks
    pub commit_hash: String,
    /// Resolved position of the commit
    #[serde(rename = "commitID", default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<usize>,
    /// Text shown by the front end
    #[serde(rename = "milestone", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Number of commits the label stays on screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_for: Option<u32>,
}

impl Milestone {
    /// Create an unresolved milestone
    #[must_use]
    pub fn new(commit_hash: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            commit_hash: commit_hash.into(),
            commit_id: None,
            label: Some(label.into()),
            display_for: None,
        }
    }
}

/// The settings document attached to a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Labelled points in history
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    /// Collapsible folders
    #[serde(default)]
    pub structures: Vec<Structure>,
}

impl Settings {
    /// Parse a settings document from JSON
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json::Error` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if the document has neither milestones nor structures
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty() && self.structures.is_empty()
    }
}

/// Summary of a prepared repository branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    /// Clone identifier of the repository
    pub url: String,
    /// Branch the metadata was computed for
    pub branch: String,
    /// Number of commits on the branch
    pub total_commits: usize,
    /// Settings with resolved positions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}
