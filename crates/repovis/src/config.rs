//! Configuration for the repovis command line
//!
//! This module provides configuration types and utilities, including the
//! store directories, the subcommands and logging options.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Repository history visualisation - windowed commit data for a branch
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "repovis")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding prepared clones
    ///
    /// Each clone identifier maps to one directory beneath it. An identifier
    /// that is itself an existing directory is opened in place.
    /// Defaults to ~/.local/share/repovis/repositories (or platform equivalent).
    #[arg(long, env = "REPOVIS_REPOS_DIR", global = true)]
    pub repos_dir: Option<PathBuf>,

    /// Directory holding settings documents
    ///
    /// Defaults to ~/.local/share/repovis/settings (or platform equivalent).
    #[arg(long, env = "REPOVIS_SETTINGS_DIR", global = true)]
    pub settings_dir: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so that stdout only carries JSON.
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve settings against a branch and print the repository metadata
    ///
    /// Resolved settings are written back to the settings store.
    Prepare {
        /// Clone identifier (URL or local path) of the repository
        #[arg(long)]
        repo: String,

        /// Branch to visualise
        #[arg(long)]
        branch: String,

        /// Key of the settings document to resolve
        #[arg(long)]
        settings: Option<String>,
    },

    /// Print a window of annotated commits
    ///
    /// Example:
    ///   repovis commits --repo ./my-repo --branch main --start-commit 100 --commit-count 25
    Commits {
        /// Clone identifier (URL or local path) of the repository
        #[arg(long)]
        repo: String,

        /// Branch to visualise
        #[arg(long)]
        branch: String,

        /// Key of the settings document whose structures apply
        #[arg(long)]
        settings: Option<String>,

        /// First commit position of the window (0 is the oldest commit)
        #[arg(long)]
        start_commit: Option<usize>,

        /// Number of commits in the window (defaults to 50)
        #[arg(long)]
        commit_count: Option<usize>,
    },

    /// Store a settings document for a repository
    ImportSettings {
        /// Clone identifier (URL or local path) of the repository
        #[arg(long)]
        repo: String,

        /// Key to store the document under
        #[arg(long)]
        settings: String,

        /// JSON file containing milestones and structures
        #[arg(long)]
        file: PathBuf,
    },
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("repovis")
}

impl Config {
    /// Get the clone directory, using a default if not specified
    #[must_use]
    pub fn repos_path(&self) -> PathBuf {
        self.repos_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("repositories"))
    }

    /// Get the settings directory, using a default if not specified
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.settings_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("settings"))
    }

    /// Validate the configuration
    ///
    /// Missing store directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A store path exists but is not a directory
    /// - A store directory cannot be created
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dir in [self.repos_path(), self.settings_path()] {
            if dir.exists() {
                if !dir.is_dir() {
                    return Err(ConfigError::NotADirectory(dir));
                }
            } else {
                std::fs::create_dir_all(&dir)
                    .map_err(|e| ConfigError::DirectoryCreateFailed(dir.clone(), e))?;
            }
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Store path exists but is not a directory
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to create a store directory
    #[error("Failed to create directory {0}: {1}")]
    DirectoryCreateFailed(PathBuf, std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.command.is_none());
        assert!(config.repos_dir.is_none());
        assert!(config.settings_dir.is_none());
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert!(config.repos_path().ends_with("repovis/repositories"));
        assert!(config.settings_path().ends_with("repovis/settings"));
    }

    #[test]
    fn test_custom_paths() {
        let config = Config {
            repos_dir: Some(PathBuf::from("/custom/repos")),
            settings_dir: Some(PathBuf::from("/custom/settings")),
            ..Default::default()
        };
        assert_eq!(config.repos_path(), PathBuf::from("/custom/repos"));
        assert_eq!(config.settings_path(), PathBuf::from("/custom/settings"));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(Config::default().log_level(), tracing::Level::INFO);
        let verbose = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(verbose.log_level(), tracing::Level::DEBUG);
        let quiet = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(quiet.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_creates_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            repos_dir: Some(dir.path().join("repos")),
            settings_dir: Some(dir.path().join("nested").join("settings")),
            ..Default::default()
        };
        config.validate().expect("validate");
        assert!(dir.path().join("repos").is_dir());
        assert!(dir.path().join("nested/settings").is_dir());
    }

    #[test]
    fn test_validate_rejects_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").expect("write");
        let config = Config {
            repos_dir: Some(file),
            settings_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_parse_commits_subcommand() {
        let config = Config::try_parse_from([
            "repovis",
            "commits",
            "--repo",
            "./repo",
            "--branch",
            "main",
            "--start-commit",
            "5",
            "-v",
        ])
        .expect("parse");
        assert!(config.verbose);
        match config.command {
            Some(Command::Commits {
                repo,
                branch,
                start_commit,
                commit_count,
                settings,
            }) => {
                assert_eq!(repo, "./repo");
                assert_eq!(branch, "main");
                assert_eq!(start_commit, Some(5));
                assert_eq!(commit_count, None);
                assert_eq!(settings, None);
            }
            other => panic!("Expected commits subcommand, got {other:?}"),
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
