//! Command-line interface components
//!
//! This module contains CLI-specific code for the Archive Fetcher
//! application: argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigAction, ConfigArgs, GlobalArgs, ReadArgs, RepositoryArgs};
pub use commands::{
    handle_articles, handle_config, handle_folders, handle_read, handle_years, AppContext,
};
