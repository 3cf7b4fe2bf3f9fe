//! Error types for Archive Fetcher
//!
//! Errors are layered the same way the application is: the transport layer
//! reports [`FetchError`], configuration handling reports [`ConfigError`],
//! and the content service turns those into the typed [`ArchiveError`] kinds
//! that callers match on for user-facing messaging and retry affordances.

use std::path::PathBuf;
use thiserror::Error;

/// Transport-level failures from the upstream content provider
///
/// Cloneable so that every caller coalesced onto one in-flight request
/// receives the same outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The requested path or URL does not exist upstream
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// The upstream API refused the request because of rate limiting
    #[error("Rate limited by upstream (HTTP {status})")]
    RateLimited { status: u16 },

    /// Any other non-success HTTP status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Connection, TLS or body read failure
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// The response body could not be decoded
    #[error("Invalid response body: {reason}")]
    Decode { reason: String },

    /// The URL could not be constructed or parsed
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },
}

impl FetchError {
    /// Whether this failure is the upstream "not found" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }

    /// Whether this failure is the upstream "rate limited" condition
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }
}

/// Configuration loading, persistence and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    /// I/O error reading or writing a configuration file
    #[error("Configuration file error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No platform configuration directory is available
    #[error("Could not determine the user configuration directory")]
    NoConfigDir,

    /// Configuration validation failed
    #[error("Configuration validation failed: {}", errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    /// The HTTP client could not be built from the client settings
    #[error("Failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),

    /// A GitHub URL could not be interpreted as a repository location
    #[error("Not a recognised GitHub repository URL: {url}")]
    UnrecognisedUrl { url: String },
}

/// Top-level error surfaced by the content service
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// A repository path does not exist
    #[error("Path does not exist: {path}")]
    PathNotFound { path: String },

    /// The GitHub API refused access because of rate limiting
    #[error("GitHub API access is rate limited, please try again later")]
    ApiLimited,

    /// Listing the repository structure failed
    #[error("Unable to fetch repository structure")]
    StructureFetchFailed {
        #[source]
        source: FetchError,
    },

    /// Listing the year folders failed
    #[error("Unable to fetch the list of year folders")]
    YearFoldersFailed {
        #[source]
        source: Box<ArchiveError>,
    },

    /// Listing the articles of a year failed
    #[error("Unable to fetch the article list for {year}")]
    ArticlesFailed {
        year: String,
        #[source]
        source: FetchError,
    },

    /// Fetching an article body failed
    #[error("Unable to fetch article content")]
    ArticleContentFailed {
        #[source]
        source: FetchError,
    },

    /// Listing all folders for folder selection failed
    #[error("Failed to load the folder list")]
    FoldersLoadFailed {
        #[source]
        source: Box<ArchiveError>,
    },

    /// A configuration update was rejected
    #[error("Invalid repository configuration: {}", messages.join("; "))]
    ConfigValidationFailed { messages: Vec<String> },

    /// Configuration could not be loaded or persisted
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ArchiveError {
    /// Check if retrying the same call later could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            ArchiveError::ApiLimited => true,
            ArchiveError::StructureFetchFailed { source }
            | ArchiveError::ArticlesFailed { source, .. }
            | ArchiveError::ArticleContentFailed { source } => matches!(
                source,
                FetchError::Timeout { .. }
                    | FetchError::Transport { .. }
                    | FetchError::ServerError { .. }
            ),
            ArchiveError::YearFoldersFailed { source }
            | ArchiveError::FoldersLoadFailed { source } => source.is_recoverable(),
            ArchiveError::PathNotFound { .. }
            | ArchiveError::ConfigValidationFailed { .. }
            | ArchiveError::Config(_) => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ArchiveError::PathNotFound { .. } => "not_found",
            ArchiveError::ApiLimited => "rate_limit",
            ArchiveError::StructureFetchFailed { .. }
            | ArchiveError::YearFoldersFailed { .. }
            | ArchiveError::FoldersLoadFailed { .. } => "structure",
            ArchiveError::ArticlesFailed { .. } => "articles",
            ArchiveError::ArticleContentFailed { .. } => "content",
            ArchiveError::ConfigValidationFailed { .. } | ArchiveError::Config(_) => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Transport result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
