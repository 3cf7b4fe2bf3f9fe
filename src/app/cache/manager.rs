//! Core cache manager with time-boxed entries
//!
//! Entries are stored together with the instant they were written. Expiry is
//! evaluated lazily on read against the injected clock; nothing is evicted in
//! the background, so an expired entry stays in memory until it is
//! overwritten or the whole cache is invalidated.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::app::models::{Article, DirectoryEntry};

use super::clock::{Clock, SystemClock};
use super::config::CacheConfig;
use super::key::CacheKey;

/// A value held by the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    Listing(Vec<DirectoryEntry>),
    Folders(Vec<String>),
    Articles(Vec<Article>),
    Content(String),
}

impl CachedValue {
    pub fn into_listing(self) -> Option<Vec<DirectoryEntry>> {
        match self {
            CachedValue::Listing(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn into_folders(self) -> Option<Vec<String>> {
        match self {
            CachedValue::Folders(folders) => Some(folders),
            _ => None,
        }
    }

    pub fn into_articles(self) -> Option<Vec<Article>> {
        match self {
            CachedValue::Articles(articles) => Some(articles),
            _ => None,
        }
    }

    pub fn into_content(self) -> Option<String> {
        match self {
            CachedValue::Content(content) => Some(content),
            _ => None,
        }
    }
}

/// A stored value and the instant it was written
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: CachedValue,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Check whether the entry has outlived `ttl` at instant `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let elapsed = now
            .signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        elapsed > ttl
    }
}

/// Snapshot of cache occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held, valid or not
    pub entries: usize,
    /// Entries still within their time-to-live
    pub valid: usize,
    /// Entries past their time-to-live but not yet overwritten
    pub expired: usize,
}

/// Process-wide content cache shared by all fetch operations
#[derive(Debug)]
pub struct CacheManager {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl CacheManager {
    /// Create a cache manager using the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache manager with an explicit time source
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        debug!("Initialized cache manager with ttl {:?}", config.ttl);
        Self {
            config,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the clock used for expiry decisions
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Raw lookup, ignoring expiry
    ///
    /// Read paths must consult [`is_expired`](Self::is_expired) before trusting
    /// the value; [`get_valid`](Self::get_valid) does both.
    pub async fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// True when no timestamp is recorded for `key` or it is older than the TTL
    pub async fn is_expired(&self, key: &CacheKey) -> bool {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => entry.is_expired_at(self.clock.now(), self.config.ttl),
            None => true,
        }
    }

    /// Lookup that only returns values still within their time-to-live
    pub async fn get_valid(&self, key: &CacheKey) -> Option<CachedValue> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.is_expired_at(self.clock.now(), self.config.ttl) {
            debug!("Cache entry expired: {}", key);
            return None;
        }
        debug!("Cache hit: {}", key);
        Some(entry.value.clone())
    }

    /// Store a value stamped with the current time, replacing any previous entry
    pub async fn set(&self, key: CacheKey, value: CachedValue) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        debug!("Cache store: {}", key);
        self.entries.write().await.insert(key, entry);
    }

    /// Drop every entry
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        let cleared = entries.len();
        entries.clear();
        info!("Cleared {} cache entries", cleared);
    }

    /// Number of entries held, including expired ones
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let now = self.clock.now();
        let expired = entries
            .values()
            .filter(|entry| entry.is_expired_at(now, self.config.ttl))
            .count();

        CacheStats {
            entries: entries.len(),
            valid: entries.len() - expired,
            expired,
        }
    }
}
