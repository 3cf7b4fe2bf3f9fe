//! Per-call-site failure handling
//!
//! Each read path decides separately what a "not found", a "rate limited" and
//! any other transport failure mean for its caller: recover with a degraded
//! value, or raise a typed error. [`FailurePolicy`] records those three
//! decisions in one value, so the degradation contract can be read, and
//! tested, without a transport.

use tracing::warn;

use crate::errors::{ArchiveError, FetchError, Result};

type Raise = Box<dyn FnOnce(FetchError) -> ArchiveError + Send>;

/// What to do with one class of failure
pub enum Strategy<T> {
    /// Swallow the failure and return this value
    Recover(T),
    /// Surface the failure as a typed error
    Raise(Raise),
}

impl<T> Strategy<T> {
    pub fn raise(to_error: impl FnOnce(FetchError) -> ArchiveError + Send + 'static) -> Self {
        Strategy::Raise(Box::new(to_error))
    }

    fn apply(self, label: &str, failure: FetchError) -> Result<T> {
        match self {
            Strategy::Recover(value) => {
                warn!("{} degraded after upstream failure: {}", label, failure);
                Ok(value)
            }
            Strategy::Raise(to_error) => Err(to_error(failure)),
        }
    }
}

impl<T> std::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Recover(_) => f.write_str("Recover"),
            Strategy::Raise(_) => f.write_str("Raise"),
        }
    }
}

/// Failure handling for one read path
#[derive(Debug)]
pub struct FailurePolicy<T> {
    /// Name of the read path, for logs
    pub label: &'static str,
    pub on_not_found: Strategy<T>,
    pub on_rate_limit: Strategy<T>,
    pub on_other: Strategy<T>,
}

impl<T> FailurePolicy<T> {
    /// Resolve a transport failure into a recovered value or a typed error
    pub fn resolve(self, failure: FetchError) -> Result<T> {
        let strategy = match failure {
            FetchError::NotFound { .. } => self.on_not_found,
            FetchError::RateLimited { .. } => self.on_rate_limit,
            _ => self.on_other,
        };
        strategy.apply(self.label, failure)
    }
}

/// Structure listing: every failure is surfaced
pub fn repo_structure<T>(path: &str) -> FailurePolicy<T> {
    let path = path.to_string();
    FailurePolicy {
        label: "repository structure",
        on_not_found: Strategy::raise(move |_| path_not_found(&path)),
        on_rate_limit: Strategy::raise(|_| ArchiveError::ApiLimited),
        on_other: Strategy::raise(|source| ArchiveError::StructureFetchFailed { source }),
    }
}

/// Year folder listing: rate limits fall back to `fallback`
pub fn year_folders(path: &str, fallback: Vec<String>) -> FailurePolicy<Vec<String>> {
    let path = path.to_string();
    FailurePolicy {
        label: "year folders",
        on_not_found: Strategy::raise(move |_| ArchiveError::YearFoldersFailed {
            source: Box::new(path_not_found(&path)),
        }),
        on_rate_limit: Strategy::Recover(fallback),
        on_other: Strategy::raise(|source| ArchiveError::YearFoldersFailed {
            source: Box::new(ArchiveError::StructureFetchFailed { source }),
        }),
    }
}

/// Folder selection listing: every failure is surfaced
pub fn all_folders(path: &str) -> FailurePolicy<Vec<String>> {
    let inner = repo_structure::<Vec<String>>(path);
    let wrap = |strategy: Strategy<Vec<String>>| match strategy {
        Strategy::Raise(to_error) => Strategy::raise(move |failure| {
            ArchiveError::FoldersLoadFailed {
                source: Box::new(to_error(failure)),
            }
        }),
        recover => recover,
    };
    FailurePolicy {
        label: "all folders",
        on_not_found: wrap(inner.on_not_found),
        on_rate_limit: wrap(inner.on_rate_limit),
        on_other: wrap(inner.on_other),
    }
}

/// Article listing: a missing year folder or a rate limit yields no articles
pub fn articles<T: Default>(year: &str) -> FailurePolicy<T> {
    let year = year.to_string();
    FailurePolicy {
        label: "article list",
        on_not_found: Strategy::Recover(T::default()),
        on_rate_limit: Strategy::Recover(T::default()),
        on_other: Strategy::raise(move |source| ArchiveError::ArticlesFailed { year, source }),
    }
}

/// Article body: rate limits serve `placeholder`
pub fn article_content(placeholder: &str) -> FailurePolicy<String> {
    FailurePolicy {
        label: "article content",
        on_not_found: Strategy::raise(|source| ArchiveError::ArticleContentFailed { source }),
        on_rate_limit: Strategy::Recover(placeholder.to_string()),
        on_other: Strategy::raise(|source| ArchiveError::ArticleContentFailed { source }),
    }
}

fn path_not_found(path: &str) -> ArchiveError {
    let path = if path.is_empty() {
        crate::constants::archive::ROOT_PATH_LABEL.to_string()
    } else {
        path.to_string()
    };
    ArchiveError::PathNotFound { path }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> FetchError {
        FetchError::NotFound {
            url: "https://api.github.com/repos/o/r/contents/x".to_string(),
        }
    }

    fn limited() -> FetchError {
        FetchError::RateLimited { status: 403 }
    }

    fn other() -> FetchError {
        FetchError::ServerError { status: 500 }
    }

    #[test]
    fn test_structure_policy_surfaces_everything() {
        let err = repo_structure::<()>("archive").resolve(not_found()).unwrap_err();
        assert!(matches!(err, ArchiveError::PathNotFound { ref path } if path == "archive"));

        let err = repo_structure::<()>("").resolve(not_found()).unwrap_err();
        assert!(matches!(err, ArchiveError::PathNotFound { ref path } if path == "root"));

        let err = repo_structure::<()>("archive").resolve(limited()).unwrap_err();
        assert!(matches!(err, ArchiveError::ApiLimited));

        let err = repo_structure::<()>("archive").resolve(other()).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::StructureFetchFailed {
                source: FetchError::ServerError { status: 500 }
            }
        ));
    }

    #[test]
    fn test_year_folder_policy_falls_back_on_rate_limit() {
        let fallback = vec!["2025".to_string(), "2024".to_string()];
        let years = year_folders("archive", fallback.clone())
            .resolve(limited())
            .unwrap();
        assert_eq!(years, fallback);

        let err = year_folders("archive", fallback.clone())
            .resolve(other())
            .unwrap_err();
        assert!(matches!(err, ArchiveError::YearFoldersFailed { .. }));

        let err = year_folders("archive", fallback).resolve(not_found()).unwrap_err();
        match err {
            ArchiveError::YearFoldersFailed { source } => {
                assert!(matches!(*source, ArchiveError::PathNotFound { .. }))
            }
            other => panic!("Expected YearFoldersFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_article_policy_recovers_missing_and_limited() {
        let missing: Vec<String> = articles("2024").resolve(not_found()).unwrap();
        assert!(missing.is_empty());

        let limited: Vec<String> = articles("2024").resolve(limited()).unwrap();
        assert!(limited.is_empty());

        let err = articles::<Vec<String>>("2024").resolve(other()).unwrap_err();
        assert!(matches!(err, ArchiveError::ArticlesFailed { ref year, .. } if year == "2024"));
    }

    #[test]
    fn test_content_policy_serves_placeholder() {
        let body = article_content("## unavailable").resolve(limited()).unwrap();
        assert_eq!(body, "## unavailable");

        let err = article_content("## unavailable")
            .resolve(FetchError::Timeout { seconds: 10 })
            .unwrap_err();
        assert!(matches!(err, ArchiveError::ArticleContentFailed { .. }));
    }

    #[test]
    fn test_all_folders_policy_wraps_structure_errors() {
        let err = all_folders("archive").resolve(limited()).unwrap_err();
        match err {
            ArchiveError::FoldersLoadFailed { source } => {
                assert!(matches!(*source, ArchiveError::ApiLimited))
            }
            other => panic!("Expected FoldersLoadFailed, got {:?}", other),
        }
    }
}
