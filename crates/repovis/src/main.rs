//! repovis: windowed commit history for repository visualisation
//!
//! This binary prepares repositories and serves windows of annotated commits
//! as JSON on stdout. Logs go to stderr.

use std::fs;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use repovis::config::{Command, Config};
use repovis::handlers::{
    CommitDataInput, ImportSettingsInput, PrepareInput, Stores, commit_data, import_settings,
    prepare_visualisation,
};
use repovis_git::Settings;
use serde::Serialize;
use tracing::debug;

fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    let Some(command) = config.command.clone() else {
        Config::command().print_help()?;
        return Ok(());
    };

    config.validate()?;
    let stores = Stores::from_config(&config);
    debug!(
        repos = %config.repos_path().display(),
        settings = %config.settings_path().display(),
        "Using stores"
    );

    run(&stores, command)
}

fn run(stores: &Stores, command: Command) -> Result<()> {
    match command {
        Command::Prepare {
            repo,
            branch,
            settings,
        } => {
            let input = PrepareInput {
                repo,
                branch,
                settings,
            };
            print_json(&prepare_visualisation(stores, &input)?)
        }
        Command::Commits {
            repo,
            branch,
            settings,
            start_commit,
            commit_count,
        } => {
            let defaults = CommitDataInput::new(repo, branch);
            let input = CommitDataInput {
                settings,
                start_commit: start_commit.unwrap_or(defaults.start_commit),
                commit_count: commit_count.unwrap_or(defaults.commit_count),
                ..defaults
            };
            print_json(&commit_data(stores, &input)?)
        }
        Command::ImportSettings {
            repo,
            settings,
            file,
        } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let document = Settings::from_json(&json)
                .with_context(|| format!("Malformed settings document {}", file.display()))?;
            let input = ImportSettingsInput {
                repo,
                settings,
                document,
            };
            print_json(&import_settings(stores, input)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
