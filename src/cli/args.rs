//! Command-line argument parsing for Archive Fetcher
//!
//! This module defines the CLI structure using clap derive macros: browsing
//! years and articles, reading an article, and managing the repository the
//! archive is read from.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::models::RepositoryUpdate;

/// Archive Fetcher - Read a GitHub-hosted archive of dated markdown articles
#[derive(Parser, Debug)]
#[command(
    name = "archive_fetcher",
    version,
    about = "Browse and read a GitHub-hosted archive of dated markdown articles",
    long_about = "Reads year folders of markdown articles from a GitHub repository.
Articles are ordered by the date or sequence number in their filenames, and
listings and article bodies are cached for the lifetime of the process."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the year folders
    Years,

    /// List the articles of a year
    Articles {
        /// Year folder name
        year: String,
    },

    /// Print an article
    Read(ReadArgs),

    /// List every folder under the base path
    Folders,

    /// Show or change the repository the archive is read from
    Config(ConfigArgs),
}

/// Arguments for the read command
#[derive(Args, Debug, Clone)]
pub struct ReadArgs {
    /// Year folder; defaults to the current year when present, else the newest
    pub year: Option<String>,

    /// Position in the article listing (1-based)
    #[arg(short, long, conflicts_with = "name")]
    pub index: Option<usize>,

    /// Exact article filename
    #[arg(short, long)]
    pub name: Option<String>,

    /// Do not warm neighbouring articles
    #[arg(long)]
    pub no_prefetch: bool,
}

/// Arguments for repository configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Repository configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the active repository and configuration files
    Show,

    /// Change the repository; unspecified fields keep their value
    Set(RepositoryArgs),

    /// Return to the configured defaults
    Reset,

    /// Check that a repository location can be listed
    Test(RepositoryArgs),

    /// Validate the configuration file and the active repository
    Validate,
}

/// Repository location given as a GitHub URL and/or individual fields
#[derive(Args, Debug, Clone, Default)]
pub struct RepositoryArgs {
    /// GitHub URL such as https://github.com/owner/repo/tree/branch/path
    #[arg(long)]
    pub url: Option<String>,

    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Folder holding the year directories (empty for the repository root)
    #[arg(long)]
    pub base_path: Option<String>,

    /// Comma-separated folders to treat as years (empty to use all)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub folders: Option<Vec<String>>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level from the verbosity flags, if any was given
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl RepositoryArgs {
    /// Explicit fields layered over the ones parsed from `--url`
    pub fn into_update(self, from_url: Option<RepositoryUpdate>) -> RepositoryUpdate {
        let base = from_url.unwrap_or_default();
        RepositoryUpdate {
            owner: self.owner.or(base.owner),
            repo: self.repo.or(base.repo),
            branch: self.branch.or(base.branch),
            base_path: self.base_path.or(base.base_path),
            selected_folders: self
                .folders
                .map(|folders| {
                    folders
                        .into_iter()
                        .map(|f| f.trim().to_string())
                        .filter(|f| !f.is_empty())
                        .collect()
                })
                .or(base.selected_folders),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.owner.is_none()
            && self.repo.is_none()
            && self.branch.is_none()
            && self.base_path.is_none()
            && self.folders.is_none()
    }
}
