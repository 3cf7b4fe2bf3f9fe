//! Prelude module for Archive Fetcher Library
//!
//! Re-exports the items needed for typical usage with a single
//! `use archive_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use archive_fetcher::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::new(&ClientConfig::default())?;
//!     let service = ArchiveService::new(
//!         Arc::new(client),
//!         Arc::new(RepoConfigStore::default()),
//!         Arc::new(CacheManager::new(CacheConfig::default())),
//!     );
//!
//!     let years = service.get_year_folders().await?;
//!     println!("Latest year: {}", service.get_latest_year(&years));
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{ArchiveError, FetchError, Result};

pub use crate::app::{
    ArchiveService, Article, CacheConfig, CacheManager, ClientConfig, Clock, ContentSource,
    DirectoryEntry, GitHubClient, RepoConfigStore, RepositoryConfig, RepositoryUpdate,
};

pub use crate::config::AppConfig;
