// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! On-disk stores for prepared repositories and settings documents
//!
//! Clones and settings are keyed by the identifiers callers pass in (a clone URL
//! and a settings key). Identifiers are mapped to file names by escaping every
//! byte outside `[A-Za-z0-9.-]`, and a leading `.`, as `_` followed by two hex
//! digits. The mapping is injective, so distinct identifiers never share a path.

use std::fs;
use std::path::{Path, PathBuf};

use repovis_git::{GitError, GitRepo, Settings};
use thiserror::Error;
use tracing::debug;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings document is not valid JSON
    #[error("Malformed settings document: {0}")]
    Json(#[from] serde_json::Error),

    /// No prepared clone for this identifier
    #[error("Repository has not been prepared: {clone}")]
    NotPrepared {
        /// The clone identifier that has no local repository
        clone: String,
    },

    /// No settings document stored under this key
    #[error("Settings not found: {key}")]
    SettingsNotFound {
        /// The settings key that was looked up
        key: String,
    },

    /// The prepared clone could not be opened
    #[error("Git error: {0}")]
    Git(#[from] GitError),
}

/// Map an identifier onto a single safe path component
#[must_use]
pub fn file_name_for(identifier: &str) -> String {
    if identifier.is_empty() {
        return "_".to_string();
    }
    let mut name = String::with_capacity(identifier.len());
    for (i, byte) in identifier.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || byte == b'-' || (byte == b'.' && i > 0);
        if keep {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("_{byte:02x}"));
        }
    }
    name
}

/// Prepared clones, one directory per clone identifier
#[derive(Debug, Clone)]
pub struct RepoStore {
    root: PathBuf,
}

impl RepoStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local directory for a clone identifier
    ///
    /// An identifier naming an existing directory is used as-is.
    #[must_use]
    pub fn path_for(&self, clone: &str) -> PathBuf {
        let direct = Path::new(clone);
        if direct.is_dir() {
            return direct.to_path_buf();
        }
        self.root.join(file_name_for(clone))
    }

    /// Open the prepared clone for an identifier
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPrepared` if no clone exists, or
    /// `StoreError::Git` if the directory is not a repository.
    pub fn open(&self, clone: &str) -> Result<GitRepo, StoreError> {
        let path = self.path_for(clone);
        if !path.exists() {
            return Err(StoreError::NotPrepared {
                clone: clone.to_string(),
            });
        }
        debug!(clone, path = %path.display(), "Opening prepared clone");
        Ok(GitRepo::open(&path)?)
    }
}

/// Settings documents stored as JSON files per clone and key
#[derive(Debug, Clone)]
pub struct SettingsStore {
    root: PathBuf,
}

impl SettingsStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File holding the settings for a clone and key
    #[must_use]
    pub fn path_for(&self, clone: &str, key: &str) -> PathBuf {
        self.root
            .join(file_name_for(clone))
            .join(format!("{}.json", file_name_for(key)))
    }

    /// Load the settings document for a clone and key
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SettingsNotFound` if nothing is stored, or an IO /
    /// JSON error if the file cannot be read.
    pub fn load(&self, clone: &str, key: &str) -> Result<Settings, StoreError> {
        let path = self.path_for(clone, key);
        if !path.is_file() {
            return Err(StoreError::SettingsNotFound {
                key: key.to_string(),
            });
        }
        let json = fs::read_to_string(&path)?;
        Ok(Settings::from_json(&json)?)
    }

    /// Persist the settings document for a clone and key
    ///
    /// # Errors
    ///
    /// Returns an IO or JSON error if the file cannot be written.
    pub fn save(&self, clone: &str, key: &str, settings: &Settings) -> Result<PathBuf, StoreError> {
        let path = self.path_for(clone, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(settings)?)?;
        debug!(clone, key, path = %path.display(), "Saved settings");
        Ok(path)
    }
}
