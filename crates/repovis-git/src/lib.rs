// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! repovis-git: commit extraction and structure collapsing
//!
//! This library crate turns a branch's history into windows of annotated
//! commits for visualisation, folding the contents of user-defined structures
//! into single nodes, and resolves the commit hashes referenced by settings
//! documents into positions in that history.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use repovis_git::{GitRepo, Structure, WindowRequest, build_window};
//!
//! let repo = GitRepo::open(".").expect("open repo");
//! let structures = vec![Structure::new("src", "sources").collapsing()];
//! let window = build_window(&repo, "main", &structures, WindowRequest::new(0, 10))
//!     .expect("build window");
//!
//! for (position, commit) in &window {
//!     println!("{position} {} ({} changes)", commit.short_hash(), commit.changes.len());
//! }
//! ```

pub mod collapse;
pub mod commit;
pub mod error;
pub mod history;
pub mod metadata;
pub mod repo;
pub mod settings;
pub mod source;
pub mod window;

pub use collapse::{ActiveSet, Step, Transition};
pub use commit::{Commit, FileChange, FileChangeType, Revision};
pub use error::GitError;
pub use history::History;
pub use metadata::{Resolution, repository_metadata, resolve_settings};
pub use repo::GitRepo;
pub use settings::{Milestone, RepositoryMetadata, Settings, Structure};
pub use source::{HistorySource, MemoryHistory};
pub use window::{
    CommitWindow, DEFAULT_COMMIT_COUNT, WindowRequest, build_window, window_from_history,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{Commit, FileChange, FileChangeType};
    pub use crate::error::GitError;
    pub use crate::repo::GitRepo;
    pub use crate::settings::{Milestone, RepositoryMetadata, Settings, Structure};
    pub use crate::source::HistorySource;
    pub use crate::window::{WindowRequest, build_window};
}
