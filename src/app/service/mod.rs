//! Content fetch service
//!
//! [`ArchiveService`] is the entry point the user interface talks to. It
//! resolves repository paths against the active configuration, lists
//! directories, turns markdown files into ordered [`Article`] records, fetches
//! article bodies and warms neighbouring articles in the background.
//!
//! Every cache-populating call goes through the shared [`CacheManager`] and is
//! coalesced: concurrent requests for the same listing or the same download
//! URL share one upstream request. What a failed request means for the caller
//! is decided per read path by the policies in [`crate::app::policy`].
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
//! let source = Arc::new(GitHubClient::new(&ClientConfig::default())?);
//! let service = ArchiveService::new(
//!     source,
//!     Arc::new(RepoConfigStore::default()),
//!     Arc::new(CacheManager::new(CacheConfig::default())),
//! );
//!
//! let years = service.get_year_folders().await?;
//! let year = service.get_latest_year(&years);
//! let articles = service.get_articles_by_year(&year).await?;
//! if let Some(article) = service.find_article_by_current_date(&articles) {
//!     println!("{}", service.get_article_content(&article.download_url).await?);
//! }
//! # Ok(())
//! # }
//! ```

mod prefetch;
pub mod selection;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Datelike;
use tracing::{debug, info};

use crate::app::cache::{CacheKey, CacheManager, CacheStats, CachedValue};
use crate::app::client::ContentSource;
use crate::app::inflight::InFlight;
use crate::app::models::{sort_articles, Article, DirectoryEntry, RepositoryConfig, RepositoryUpdate};
use crate::app::policy;
use crate::app::settings::RepoConfigStore;
use crate::constants::{archive, prefetch as prefetch_constants};
use crate::errors::{FetchError, FetchResult, Result};

pub use prefetch::neighbour_indices;

struct Inner {
    source: Arc<dyn ContentSource>,
    settings: Arc<RepoConfigStore>,
    cache: Arc<CacheManager>,
    listings: InFlight<CacheKey, Vec<DirectoryEntry>, FetchError>,
    contents: InFlight<String, String, FetchError>,
    /// Download URLs with a preload task scheduled or running
    queued: Mutex<HashSet<String>>,
    prefetch_window: usize,
}

/// Article archive access with caching, coalescing and prefetch
///
/// Cheap to clone; clones share the cache, the in-flight maps and the
/// configuration provider.
#[derive(Clone)]
pub struct ArchiveService {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ArchiveService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveService")
            .field("repository", &self.inner.settings.get_config())
            .field("in_flight_listings", &self.inner.listings.len())
            .field("in_flight_contents", &self.inner.contents.len())
            .field("prefetch_window", &self.inner.prefetch_window)
            .finish()
    }
}

impl ArchiveService {
    /// Create a service with the default prefetch window
    pub fn new(
        source: Arc<dyn ContentSource>,
        settings: Arc<RepoConfigStore>,
        cache: Arc<CacheManager>,
    ) -> Self {
        Self::with_prefetch_window(source, settings, cache, prefetch_constants::DEFAULT_WINDOW)
    }

    /// Create a service that warms `prefetch_window` articles on each side
    pub fn with_prefetch_window(
        source: Arc<dyn ContentSource>,
        settings: Arc<RepoConfigStore>,
        cache: Arc<CacheManager>,
        prefetch_window: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                settings,
                cache,
                listings: InFlight::new(),
                contents: InFlight::new(),
                queued: Mutex::new(HashSet::new()),
                prefetch_window,
            }),
        }
    }

    pub fn settings(&self) -> &Arc<RepoConfigStore> {
        &self.inner.settings
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.inner.cache
    }

    pub fn prefetch_window(&self) -> usize {
        self.inner.prefetch_window
    }

    /// List a directory relative to the base path
    ///
    /// # Errors
    ///
    /// `PathNotFound` with the resolved path (`root` when that is empty) when
    /// the path does not exist, `ApiLimited` when rate limited,
    /// `StructureFetchFailed` otherwise
    pub async fn get_repo_structure(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let config = self.inner.settings.get_config();
        let full_path = config.resolve_path(path);
        match self.list_cached(&config, &full_path).await {
            Ok(entries) => Ok(entries),
            Err(failure) => policy::repo_structure(&full_path).resolve(failure),
        }
    }

    /// Year folder names
    ///
    /// A non-empty folder allow-list is returned as is, without touching the
    /// network. Otherwise the directories under the base path are listed and
    /// sorted. When rate limited, a fixed list of recent years is served
    /// instead and not cached.
    pub async fn get_year_folders(&self) -> Result<Vec<String>> {
        let config = self.inner.settings.get_config();
        let key = CacheKey::year_folders(&config);
        if let Some(folders) = self.cached(&key, CachedValue::into_folders).await {
            return Ok(folders);
        }

        if !config.selected_folders.is_empty() {
            debug!("Using {} selected folders", config.selected_folders.len());
            let folders = config.selected_folders.clone();
            self.inner
                .cache
                .set(key, CachedValue::Folders(folders.clone()))
                .await;
            return Ok(folders);
        }

        let base = config.resolve_path("");
        match self.list_cached(&config, &base).await {
            Ok(entries) => {
                let folders = directory_names(&entries);
                info!("Found {} year folders", folders.len());
                self.inner
                    .cache
                    .set(key, CachedValue::Folders(folders.clone()))
                    .await;
                Ok(folders)
            }
            Err(failure) => {
                let fallback = archive::FALLBACK_YEARS.iter().map(|y| y.to_string()).collect();
                policy::year_folders(&base, fallback).resolve(failure)
            }
        }
    }

    /// Articles of one year in presentation order
    ///
    /// A missing year folder and a rate-limited listing both yield an empty
    /// list; neither is cached.
    pub async fn get_articles_by_year(&self, year: &str) -> Result<Vec<Article>> {
        let config = self.inner.settings.get_config();
        let key = CacheKey::articles(&config, year);
        if let Some(articles) = self.cached(&key, CachedValue::into_articles).await {
            return Ok(articles);
        }

        match self.list_cached(&config, &config.resolve_path(year)).await {
            Ok(entries) => {
                let mut articles: Vec<Article> = entries
                    .iter()
                    .filter(|entry| entry.is_article())
                    .map(Article::from_entry)
                    .collect();
                sort_articles(&mut articles);
                info!("Found {} articles for {}", articles.len(), year);
                self.inner
                    .cache
                    .set(key, CachedValue::Articles(articles.clone()))
                    .await;
                Ok(articles)
            }
            Err(failure) => policy::articles(year).resolve(failure),
        }
    }

    /// Raw markdown of an article
    ///
    /// Joins a fetch already running for the same URL. When rate limited, a
    /// placeholder document is returned instead of an error.
    pub async fn get_article_content(&self, download_url: &str) -> Result<String> {
        match self.fetch_content(download_url).await {
            Ok(body) => Ok(body),
            Err(failure) => {
                policy::article_content(archive::RATE_LIMITED_PLACEHOLDER).resolve(failure)
            }
        }
    }

    /// Every folder under the base path, ignoring the allow-list
    pub async fn get_all_folders(&self) -> Result<Vec<String>> {
        let config = self.inner.settings.get_config();
        let base = config.resolve_path("");
        match self.list_cached(&config, &base).await {
            Ok(entries) => Ok(directory_names(&entries)),
            Err(failure) => policy::all_folders(&base).resolve(failure),
        }
    }

    /// Check that `config` points at a listable location
    ///
    /// Bypasses the cache and never fails; any error counts as `false`.
    pub async fn test_repo_connection(&self, config: &RepositoryConfig) -> bool {
        match self
            .inner
            .source
            .list_directory(config, &config.resolve_path(""))
            .await
        {
            Ok(entries) => {
                info!(
                    "Connection to {}/{}@{} ok ({} entries)",
                    config.owner,
                    config.repo,
                    config.branch,
                    entries.len()
                );
                true
            }
            Err(e) => {
                info!(
                    "Connection to {}/{}@{} failed: {}",
                    config.owner, config.repo, config.branch, e
                );
                false
            }
        }
    }

    /// Article dated today, else the first dated article
    pub fn find_article_by_current_date<'a>(&self, articles: &'a [Article]) -> Option<&'a Article> {
        selection::find_article_for_date(articles, self.inner.cache.clock().today())
    }

    /// Current calendar year
    pub fn get_current_year(&self) -> String {
        self.inner.cache.clock().today().year().to_string()
    }

    /// Newest year in `years`, or the current year when there is none
    pub fn get_latest_year(&self, years: &[String]) -> String {
        selection::latest_year(years).unwrap_or_else(|| self.get_current_year())
    }

    /// Year to open first: the current year when listed, else the newest one
    pub fn get_default_year(&self, years: &[String]) -> String {
        let current = self.get_current_year();
        if years.contains(&current) {
            current
        } else {
            self.get_latest_year(years)
        }
    }

    /// Drop every cached value so the next reads go upstream
    pub async fn force_refresh(&self) {
        info!("Force refresh requested");
        self.inner.cache.invalidate_all().await;
    }

    pub async fn clear_cache(&self) {
        self.inner.cache.invalidate_all().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats().await
    }

    /// Validate, persist and activate a repository configuration change
    ///
    /// The cache is cleared once the change is accepted.
    pub async fn update_repository(&self, update: &RepositoryUpdate) -> Result<RepositoryConfig> {
        let config = self.inner.settings.update_repo(update).await?;
        self.inner.cache.invalidate_all().await;
        Ok(config)
    }

    /// Return to the default repository and clear the cache
    pub async fn reset_repository(&self) -> Result<RepositoryConfig> {
        self.inner.settings.reset_to_default().await?;
        self.inner.cache.invalidate_all().await;
        Ok(self.inner.settings.get_config())
    }

    async fn cached<T>(&self, key: &CacheKey, extract: fn(CachedValue) -> Option<T>) -> Option<T> {
        self.inner.cache.get_valid(key).await.and_then(extract)
    }

    /// Directory listing through the cache, coalesced per key
    async fn list_cached(
        &self,
        config: &RepositoryConfig,
        full_path: &str,
    ) -> FetchResult<Vec<DirectoryEntry>> {
        let key = CacheKey::listing(config, full_path);
        if let Some(entries) = self.cached(&key, CachedValue::into_listing).await {
            return Ok(entries);
        }

        let inner = &self.inner;
        inner
            .listings
            .run(key.clone(), || async move {
                debug!("Listing '{}' from upstream", full_path);
                let entries = inner.source.list_directory(config, full_path).await?;
                inner
                    .cache
                    .set(key, CachedValue::Listing(entries.clone()))
                    .await;
                Ok(entries)
            })
            .await
    }

    /// Article body through the cache, coalesced per download URL
    async fn fetch_content(&self, download_url: &str) -> FetchResult<String> {
        let key = CacheKey::content(download_url);
        if let Some(body) = self.cached(&key, CachedValue::into_content).await {
            return Ok(body);
        }

        let inner = &self.inner;
        inner
            .contents
            .run(download_url.to_string(), || async move {
                debug!("Fetching {}", download_url);
                let body = inner.source.fetch_raw(download_url).await?;
                inner.cache.set(key, CachedValue::Content(body.clone())).await;
                Ok(body)
            })
            .await
    }
}

/// Sorted names of the directory entries
fn directory_names(entries: &[DirectoryEntry]) -> Vec<String> {
    let mut names: Vec<String> = entries
        .iter()
        .filter(|entry| entry.is_dir())
        .map(|entry| entry.name.clone())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::EntryType;

    fn entry(name: &str, entry_type: EntryType) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            path: format!("archive/{}", name),
            entry_type,
            size: 0,
            download_url: None,
            content_sha: String::new(),
        }
    }

    #[test]
    fn test_directory_names_keeps_sorted_dirs_only() {
        let entries = vec![
            entry("2024", EntryType::Dir),
            entry("README.md", EntryType::File),
            entry("2022", EntryType::Dir),
            entry("vendor", EntryType::Other),
            entry("2023", EntryType::Dir),
        ];
        assert_eq!(directory_names(&entries), vec!["2022", "2023", "2024"]);
    }
}
