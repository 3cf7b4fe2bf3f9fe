//! Time-boxed in-memory cache shared by all fetch operations
//!
//! # Key Features
//!
//! - **Injected clock**: expiry decisions come from a [`Clock`], so tests run
//!   against a [`ManualClock`] instead of sleeping
//! - **Lazy expiry**: entries are checked against the TTL when read, never
//!   evicted in the background
//! - **Structured keys**: [`CacheKey`] carries every dimension of the cached
//!   value (repository identity, path, year, URL)
//! - **Explicit invalidation**: the whole cache is cleared on force-refresh and
//!   when the repository configuration changes
//!
//! # Module Organization
//!
//! - [`config`] - Configuration types and defaults
//! - [`clock`] - Time sources
//! - [`key`] - Cache key construction
//! - [`manager`] - The cache itself
//!
//! # Examples
//!
//! ```rust
//! use archive_fetcher::app::cache::{CacheConfig, CacheKey, CacheManager, CachedValue};
//!
//! # async fn example() {
//! let cache = CacheManager::new(CacheConfig::default());
//! let key = CacheKey::content("https://raw.githubusercontent.com/o/r/main/a.md");
//!
//! cache.set(key.clone(), CachedValue::Content("# Title".to_string())).await;
//! assert!(cache.get_valid(&key).await.is_some());
//!
//! cache.invalidate_all().await;
//! assert!(cache.is_expired(&key).await);
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod key;
pub mod manager;

// Re-export main public API
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use key::{CacheKey, RepoScope};
pub use manager::{CacheEntry, CacheManager, CacheStats, CachedValue};
