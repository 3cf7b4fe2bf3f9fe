//! Application constants for Archive Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Static GitHub API token, sent as a bearer credential when present
    pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
}

/// GitHub endpoints and request headers
pub mod github {
    /// GitHub REST API base URL
    pub const API_BASE_URL: &str = "https://api.github.com";

    /// Media type requested from the contents API
    pub const ACCEPT: &str = "application/vnd.github.v3+json";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "Archive-Fetcher/0.1.0";

    /// Upper bound for a single request, after which it fails as a transport error
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Client-side pacing
pub mod limits {
    /// Default request rate towards GitHub (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 10;

    /// Maximum jitter added when waiting for a pacing slot (milliseconds)
    pub const PACING_JITTER_MS: u64 = 50;
}

/// Cache configuration constants
pub mod cache {
    use super::Duration;

    /// Time-to-live for every cache entry
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
}

/// Prefetch configuration constants
pub mod prefetch {
    /// Number of neighbours warmed on each side of the focal article
    pub const DEFAULT_WINDOW: usize = 2;
}

/// Archive layout and degraded-mode defaults
pub mod archive {
    /// File extension that marks an article
    pub const ARTICLE_EXTENSION: &str = ".md";

    /// Display name for an empty repository path
    pub const ROOT_PATH_LABEL: &str = "root";

    /// Year folders served when the API is rate limited
    pub const FALLBACK_YEARS: [&str; 4] = ["2025", "2024", "2023", "2022"];

    /// Markdown served in place of an article body when the API is rate limited
    pub const RATE_LIMITED_PLACEHOLDER: &str = "## Article content is temporarily unavailable\n\n\
        The GitHub API rate limit has been reached, so this article cannot be shown right now. \
        Please try again later.";
}

/// Default repository location
pub mod repository {
    /// Default repository owner
    pub const DEFAULT_OWNER: &str = "dubuqingfeng";

    /// Default repository name
    pub const DEFAULT_REPO: &str = "yarb-web3";

    /// Default branch
    pub const DEFAULT_BRANCH: &str = "main";

    /// Default folder holding the year directories
    pub const DEFAULT_BASE_PATH: &str = "archive";
}

/// Configuration file locations
pub mod files {
    /// Directory name under the platform configuration directory
    pub const APP_DIR_NAME: &str = "archive-fetcher";

    /// Application configuration file name
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    /// Persisted repository overrides file name
    pub const REPOSITORY_FILE_NAME: &str = "repository.toml";
}

// Re-export commonly used constants at module level
pub use archive::{ARTICLE_EXTENSION, FALLBACK_YEARS};
pub use cache::DEFAULT_TTL;
pub use http::USER_AGENT;
pub use prefetch::DEFAULT_WINDOW;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_reasonable() {
        assert_eq!(DEFAULT_TTL, Duration::from_secs(1800));
        assert_eq!(http::DEFAULT_TIMEOUT, Duration::from_secs(10));
        assert_eq!(DEFAULT_WINDOW, 2);
        assert_eq!(FALLBACK_YEARS.len(), 4);
        assert!(USER_AGENT.contains("Archive-Fetcher"));
    }

    #[test]
    fn test_fallback_years_are_recent_first() {
        let years: Vec<u32> = FALLBACK_YEARS.iter().map(|y| y.parse().unwrap()).collect();
        assert!(years.windows(2).all(|w| w[0] > w[1]));
    }
}
