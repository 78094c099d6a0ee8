//! Request handlers for the visualisation service
//!
//! This module implements the handlers behind each request, bridging the
//! on-disk stores to the commit window builder and the metadata resolver.
//! Every handler returns plain data ready to serialise and logs failures
//! before handing them back.

use std::path::PathBuf;

use repovis_git::{
    CommitWindow, DEFAULT_COMMIT_COUNT, GitError, History, RepositoryMetadata, Revision,
    Settings, WindowRequest, repository_metadata, resolve_settings, window_from_history,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::store::{RepoStore, SettingsStore, StoreError};

// ============================================================================
// Error Types
// ============================================================================

/// Handler errors
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The requested branch does not resolve
    #[error("That branch does not exist on that repository: {0}")]
    BranchNotFound(String),

    /// Walking, diffing or opening the repository failed
    #[error("That repository cannot be visualised: {0}")]
    Traverse(String),

    /// No prepared clone for the identifier
    #[error("You must prepare the repository before requesting its commits: {0}")]
    NotPrepared(String),

    /// Settings document could not be loaded or stored
    #[error("Settings error: {0}")]
    Settings(StoreError),

    /// Invalid input - missing or malformed field
    #[error("Invalid input: {0}. Check the request's required parameters.")]
    InvalidInput(String),
}

impl From<GitError> for HandlerError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::BranchNotFound { branch } => Self::BranchNotFound(branch),
            other => Self::Traverse(other.to_string()),
        }
    }
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotPrepared { clone } => Self::NotPrepared(clone),
            StoreError::Git(git) => git.into(),
            other => Self::Settings(other),
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// The stores every handler reads from
#[derive(Debug, Clone)]
pub struct Stores {
    /// Prepared clones
    pub repos: RepoStore,
    /// Settings documents
    pub settings: SettingsStore,
}

impl Stores {
    /// Create stores rooted at the given directories
    #[must_use]
    pub fn new(repos: impl Into<PathBuf>, settings: impl Into<PathBuf>) -> Self {
        Self {
            repos: RepoStore::new(repos),
            settings: SettingsStore::new(settings),
        }
    }

    /// Create stores from the configured directories
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.repos_path(), config.settings_path())
    }
}

// ============================================================================
// Input Types
// ============================================================================

/// Input for the commit data request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDataInput {
    /// Clone identifier of the repository
    pub repo: String,
    /// Branch to visualise
    pub branch: String,
    /// Key of the settings document whose structures apply
    pub settings: Option<String>,
    /// First position of the window
    pub start_commit: usize,
    /// Number of commits in the window
    pub commit_count: usize,
}

impl CommitDataInput {
    /// A request for the first `DEFAULT_COMMIT_COUNT` commits without settings
    #[must_use]
    pub fn new(repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
            settings: None,
            start_commit: 0,
            commit_count: DEFAULT_COMMIT_COUNT,
        }
    }
}

/// Input for the prepare request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareInput {
    /// Clone identifier of the repository
    pub repo: String,
    /// Branch to visualise
    pub branch: String,
    /// Key of the settings document to resolve
    pub settings: Option<String>,
}

/// Input for the settings import request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettingsInput {
    /// Clone identifier of the repository
    pub repo: String,
    /// Key to store the document under
    pub settings: String,
    /// The document itself
    pub document: Settings,
}

// ============================================================================
// Output Types
// ============================================================================

/// Response from the settings import request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Where the document was written
    pub path: PathBuf,
    /// Milestones stored
    pub milestones: usize,
    /// Structures stored
    pub structures: usize,
}

// ============================================================================
// Handler Functions
// ============================================================================

fn require(field: &str, value: &str) -> Result<(), HandlerError> {
    if value.trim().is_empty() {
        return Err(HandlerError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn load_settings(
    stores: &Stores,
    repo: &str,
    key: Option<&str>,
) -> Result<Option<Settings>, HandlerError> {
    key.map(|key| stores.settings.load(repo, key))
        .transpose()
        .map_err(HandlerError::from)
}

/// Build the commit window for a prepared repository
///
/// # Errors
///
/// Returns `HandlerError::NotPrepared` if the clone is missing,
/// `HandlerError::BranchNotFound` if the branch does not resolve, and
/// `HandlerError::InvalidInput` for an empty identifier or a zero count.
pub fn commit_data(stores: &Stores, input: &CommitDataInput) -> Result<CommitWindow, HandlerError> {
    window_for(stores, input).inspect_err(|e| {
        error!(repo = %input.repo, branch = %input.branch, error = %e, "Commit data request failed");
    })
}

fn window_for(stores: &Stores, input: &CommitDataInput) -> Result<CommitWindow, HandlerError> {
    require("Repository", &input.repo)?;
    require("Branch", &input.branch)?;
    if input.commit_count == 0 {
        return Err(HandlerError::InvalidInput(
            "commitCount must be greater than zero".to_string(),
        ));
    }

    let repo = stores.repos.open(&input.repo)?;
    let settings = load_settings(stores, &input.repo, input.settings.as_deref())?;
    let history = History::load(&repo, &input.branch)?;

    // Documents imported but never prepared still carry bare hashes
    let structures = settings
        .map(|mut settings| {
            resolve_settings(&history, &mut settings);
            settings.structures
        })
        .unwrap_or_default();

    let request = WindowRequest::new(input.start_commit, input.commit_count);
    let window = window_from_history(&repo, &history, &structures, request)?;
    info!(
        repo = %input.repo,
        branch = %input.branch,
        start = input.start_commit,
        returned = window.len(),
        "Served commit data"
    );
    Ok(window)
}

/// Resolve settings against a branch and describe the repository
///
/// The resolved settings are written back to the settings store so later
/// commit data requests see positions rather than hashes.
///
/// # Errors
///
/// Returns `HandlerError::NotPrepared` if the clone is missing,
/// `HandlerError::BranchNotFound` if the branch does not resolve, or
/// `HandlerError::Settings` if the settings document cannot be read or written.
pub fn prepare_visualisation(
    stores: &Stores,
    input: &PrepareInput,
) -> Result<RepositoryMetadata, HandlerError> {
    prepare(stores, input).inspect_err(|e| {
        error!(repo = %input.repo, branch = %input.branch, error = %e, "Prepare request failed");
    })
}

fn prepare(stores: &Stores, input: &PrepareInput) -> Result<RepositoryMetadata, HandlerError> {
    require("Repository", &input.repo)?;
    require("Branch", &input.branch)?;

    let repo = stores.repos.open(&input.repo)?;
    let settings = load_settings(stores, &input.repo, input.settings.as_deref())?;
    let metadata = repository_metadata(&repo, &input.repo, &input.branch, settings)?;

    if let (Some(key), Some(resolved)) = (input.settings.as_deref(), metadata.settings.as_ref()) {
        stores.settings.save(&input.repo, key, resolved)?;
    }

    info!(
        repo = %input.repo,
        branch = %input.branch,
        total_commits = metadata.total_commits,
        "Prepared repository"
    );
    Ok(metadata)
}

/// Validate a user supplied settings document and store it
///
/// Resolved positions in the incoming document are discarded; they are
/// filled in again by the next prepare request.
///
/// # Errors
///
/// Returns `HandlerError::InvalidInput` if a structure lacks a folder or
/// label, or a referenced hash is not a full commit hash.
pub fn import_settings(
    stores: &Stores,
    input: ImportSettingsInput,
) -> Result<ImportResponse, HandlerError> {
    let repo = input.repo.clone();
    store_document(stores, input).inspect_err(|e| {
        error!(repo = %repo, error = %e, "Settings import failed");
    })
}

fn store_document(
    stores: &Stores,
    input: ImportSettingsInput,
) -> Result<ImportResponse, HandlerError> {
    require("Repository", &input.repo)?;
    require("Settings key", &input.settings)?;

    let mut document = input.document;
    for milestone in &mut document.milestones {
        if !Revision::is_valid_hash(&milestone.commit_hash) {
            return Err(HandlerError::InvalidInput(format!(
                "Milestone hash is not a commit hash: {}",
                milestone.commit_hash
            )));
        }
        milestone.commit_id = None;
    }
    for structure in &mut document.structures {
        require("Structure folder", structure.folder_path())?;
        require("Structure label", &structure.label)?;
        for hash in [&structure.start_commit_hash, &structure.end_commit_hash]
            .into_iter()
            .flatten()
        {
            if !Revision::is_valid_hash(hash) {
                return Err(HandlerError::InvalidInput(format!(
                    "Structure boundary is not a commit hash: {hash}"
                )));
            }
        }
        structure.start_commit_id = None;
        structure.end_commit_id = None;
    }

    let path = stores.settings.save(&input.repo, &input.settings, &document)?;
    info!(
        repo = %input.repo,
        key = %input.settings,
        path = %path.display(),
        "Imported settings"
    );
    Ok(ImportResponse {
        path,
        milestones: document.milestones.len(),
        structures: document.structures.len(),
    })
}

// ============================================================================
// Tests
// ============================================================================
