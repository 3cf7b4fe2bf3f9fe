//! Archive Fetcher Library
//!
//! A Rust library for reading a GitHub-hosted archive of dated markdown
//! articles organised by year folders. Provides ordered article listings,
//! time-boxed caching, request coalescing and background prefetch, with
//! typed degradation when the GitHub API is rate limited.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{ArchiveError, Result};
