//! Core application logic for Archive Fetcher
//!
//! This module contains the article archive data-access layer: the GitHub
//! client, filename parsing and article ordering, the time-boxed cache, the
//! repository configuration provider and the content service tying them
//! together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use archive_fetcher::app::{
//!     ArchiveService, CacheConfig, CacheManager, ClientConfig, GitHubClient, RepoConfigStore,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitHubClient::new(&ClientConfig::default().with_token_from_env())?;
//! let service = ArchiveService::new(
//!     Arc::new(client),
//!     Arc::new(RepoConfigStore::default()),
//!     Arc::new(CacheManager::new(CacheConfig::default())),
//! );
//!
//! for year in service.get_year_folders().await? {
//!     let articles = service.get_articles_by_year(&year).await?;
//!     println!("{}: {} articles", year, articles.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod filename;
pub mod inflight;
pub mod models;
pub mod policy;
pub mod service;
pub mod settings;

// Re-export main public API
pub use cache::{CacheConfig, CacheKey, CacheManager, CacheStats, Clock, ManualClock, SystemClock};
pub use client::{ClientConfig, ContentSource, GitHubClient};
pub use filename::{display_title, parse_date, parse_sequence_number};
pub use models::{Article, DirectoryEntry, EntryType, RepositoryConfig, RepositoryUpdate};
pub use service::ArchiveService;
pub use settings::{parse_github_url, RepoConfigStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = RepositoryConfig::default();
        assert_eq!(config.branch, "main");
        assert_eq!(parse_sequence_number("01. intro.md"), Some(1));
    }
}
