//! Commit and file change types
//!
//! [`Revision`] is what a history walk yields for each commit; [`Commit`] is the
//! annotated, collapsed record handed to the front end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit as produced by walking a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// The commit hash (40 hex characters)
    pub hash: String,
    /// Author name
    pub author: String,
    /// Commit (committer) time
    pub timestamp: DateTime<Utc>,
    /// Parent commit hashes, first parent first
    pub parents: Vec<String>,
}

impl Revision {
    /// Validate that a hash is a valid 40-character hex string
    #[must_use]
    pub fn is_valid_hash(hash: &str) -> bool {
        hash.len() == 40 && hash.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// The first parent, followed when diffing
    #[must_use]
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// Check if this is a merge commit (has multiple parents)
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Check if this is a root commit (has no parents)
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Kind of a file event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileChangeType {
    /// File added (also the fallback for renames, copies and type changes)
    #[serde(rename = "A")]
    Added,
    /// File content changed
    #[serde(rename = "M")]
    Modified,
    /// File removed
    #[serde(rename = "D")]
    Deleted,
    /// File revealed when a structure stops collapsing its folder
    #[serde(rename = "EXPANDED")]
    Expanded,
}

impl FileChangeType {
    /// Map a git2 delta status onto a file change kind
    ///
    /// Anything other than an add, modify or delete is reported as `Added`.
    #[must_use]
    pub fn from_delta(delta: git2::Delta) -> Self {
        match delta {
            git2::Delta::Added => Self::Added,
            git2::Delta::Modified => Self::Modified,
            git2::Delta::Deleted => Self::Deleted,
            _ => Self::Added,
        }
    }
}

/// A single file event within a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileChange {
    /// What happened to the file
    #[serde(rename = "type")]
    pub change_type: FileChangeType,
    /// Repository-relative path, or `<folder>/<label>` once collapsed
    #[serde(rename = "file")]
    pub path: String,
    /// True for the synthetic node standing in for a collapsed structure
    #[serde(default)]
    pub collapsed: bool,
}

impl FileChange {
    /// Create an uncollapsed change
    #[must_use]
    pub fn new(change_type: FileChangeType, path: impl Into<String>) -> Self {
        Self {
            change_type,
            path: path.into(),
            collapsed: false,
        }
    }

    /// Shorthand for an `Added` change
    #[must_use]
    pub fn added(path: impl Into<String>) -> Self {
        Self::new(FileChangeType::Added, path)
    }

    /// Shorthand for a `Modified` change
    #[must_use]
    pub fn modified(path: impl Into<String>) -> Self {
        Self::new(FileChangeType::Modified, path)
    }

    /// Shorthand for a `Deleted` change
    #[must_use]
    pub fn deleted(path: impl Into<String>) -> Self {
        Self::new(FileChangeType::Deleted, path)
    }

    /// Shorthand for an `Expanded` change
    #[must_use]
    pub fn expanded(path: impl Into<String>) -> Self {
        Self::new(FileChangeType::Expanded, path)
    }
}

/// A commit annotated with its collapsed change list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Position of the commit in branch history, 0 being the oldest
    #[serde(rename = "commitId")]
    pub index: usize,
    /// Commit (committer) time, serialised as unix seconds
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    /// Author name
    pub author: String,
    /// The commit hash
    #[serde(rename = "commitHash")]
    pub hash: String,
    /// File events, collapsed changes first and closing expansions last
    pub changes: Vec<FileChange>,
}

impl Commit {
    /// Build the record for a revision at a given position
    #[must_use]
    pub fn from_revision(index: usize, revision: &Revision, changes: Vec<FileChange>) -> Self {
        Self {
            index,
            timestamp: revision.timestamp,
            author: revision.author.clone(),
            hash: revision.hash.clone(),
            changes,
        }
    }

    /// Get the short hash (first 7 characters)
    #[must_use]
    pub fn short_hash(&self) -> &str {
        match self.hash.char_indices().nth(7) {
            Some((end, _)) => &self.hash[..end],
            None => &self.hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn sample_revision() -> Revision {
        Revision {
            hash: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".to_string(),
            author: "Test Author".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 17, 2, 33, 6).unwrap(),
            parents: vec!["c460aeb7fb2d109c17e43de0ce681faec0b7374d".to_string()],
        }
    }

    #[test]
    fn test_is_valid_hash() {
        assert!(Revision::is_valid_hash(
            "1945ab9c752534e733c38ba0109dc3b741f0a6eb"
        ));
        assert!(!Revision::is_valid_hash("1945ab9"));
        assert!(!Revision::is_valid_hash(
            "1945ab9c752534e733c38ba0109dc3b741f0a6eg"
        ));
        assert!(!Revision::is_valid_hash(""));
    }

    #[test]
    fn test_root_and_merge() {
        let mut revision = sample_revision();
        assert!(!revision.is_root());
        assert!(!revision.is_merge());
        assert_eq!(
            revision.first_parent(),
            Some("c460aeb7fb2d109c17e43de0ce681faec0b7374d")
        );

        revision.parents.push("b".repeat(40));
        assert!(revision.is_merge());

        revision.parents.clear();
        assert!(revision.is_root());
        assert_eq!(revision.first_parent(), None);
    }

    #[test]
    fn test_delta_mapping_falls_back_to_added() {
        assert_eq!(
            FileChangeType::from_delta(git2::Delta::Added),
            FileChangeType::Added
        );
        assert_eq!(
            FileChangeType::from_delta(git2::Delta::Modified),
            FileChangeType::Modified
        );
        assert_eq!(
            FileChangeType::from_delta(git2::Delta::Deleted),
            FileChangeType::Deleted
        );
        for delta in [
            git2::Delta::Renamed,
            git2::Delta::Copied,
            git2::Delta::Typechange,
            git2::Delta::Unmodified,
        ] {
            assert_eq!(FileChangeType::from_delta(delta), FileChangeType::Added);
        }
    }

    #[test]
    fn test_file_change_json_format() {
        let change = FileChange::deleted("src/lib.rs");
        let json = serde_json::to_value(&change).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"type": "D", "file": "src/lib.rs", "collapsed": false})
        );

        let expanded = serde_json::to_value(FileChange::expanded("a")).expect("serialize");
        assert_eq!(expanded["type"], "EXPANDED");
    }

    #[test]
    fn test_file_change_collapsed_defaults_to_false() {
        let change: FileChange =
            serde_json::from_str(r#"{"type": "M", "file": "README.md"}"#).expect("deserialize");
        assert_eq!(change, FileChange::modified("README.md"));
    }

    #[test]
    fn test_commit_json_format() {
        let revision = sample_revision();
        let commit = Commit::from_revision(4, &revision, vec![FileChange::added("a.txt")]);
        let json = serde_json::to_value(&commit).expect("serialize");

        assert_eq!(json["commitId"], 4);
        assert_eq!(json["commitHash"], revision.hash.as_str());
        assert_eq!(json["author"], "Test Author");
        assert_eq!(json["timestamp"], revision.timestamp.timestamp());
        assert_eq!(json["changes"][0]["file"], "a.txt");

        let back: Commit = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, commit);
    }

    #[test]
    fn test_short_hash() {
        let revision = sample_revision();
        let mut commit = Commit::from_revision(0, &revision, Vec::new());
        assert_eq!(commit.short_hash(), "1945ab9");
        commit.hash = "abc".to_string();
        assert_eq!(commit.short_hash(), "abc");
    }

    #[test]
    fn test_short_hash_of_deserialized_non_ascii_hash() {
        let commit: Commit = serde_json::from_value(serde_json::json!({
            "commitId": 0,
            "timestamp": 1_700_000_000,
            "author": "dev",
            "commitHash": "ééééééééé",
            "changes": []
        }))
        .expect("deserialize");
        assert_eq!(commit.short_hash(), "ééééééé");

        let short: Commit = serde_json::from_value(serde_json::json!({
            "commitId": 1,
            "timestamp": 1_700_000_000,
            "author": "dev",
            "commitHash": "aé",
            "changes": []
        }))
        .expect("deserialize");
        assert_eq!(short.short_hash(), "aé");
    }
}
