//! Structured cache keys
//!
//! Every key carries all of the dimensions that affect the cached value, so
//! switching repository, branch or base path can never serve data cached for
//! another source.

use std::fmt;

use crate::app::models::RepositoryConfig;

/// Repository identity portion of a cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoScope {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub base_path: String,
}

impl From<&RepositoryConfig> for RepoScope {
    fn from(config: &RepositoryConfig) -> Self {
        Self {
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            base_path: config.base_path.clone(),
        }
    }
}

impl fmt::Display for RepoScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}:{}",
            self.owner, self.repo, self.branch, self.base_path
        )
    }
}

/// Key of a cached value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Raw directory listing at a resolved repository path
    Listing { scope: RepoScope, path: String },
    /// Year folder names; depends on the folder allow-list too
    YearFolders {
        scope: RepoScope,
        selected: Vec<String>,
    },
    /// Sorted articles of one year
    Articles { scope: RepoScope, year: String },
    /// Article body, keyed only by its download URL
    Content { url: String },
}

impl CacheKey {
    pub fn listing(config: &RepositoryConfig, path: impl Into<String>) -> Self {
        Self::Listing {
            scope: config.into(),
            path: path.into(),
        }
    }

    pub fn year_folders(config: &RepositoryConfig) -> Self {
        Self::YearFolders {
            scope: config.into(),
            selected: config.selected_folders.clone(),
        }
    }

    pub fn articles(config: &RepositoryConfig, year: impl Into<String>) -> Self {
        Self::Articles {
            scope: config.into(),
            year: year.into(),
        }
    }

    pub fn content(url: impl Into<String>) -> Self {
        Self::Content { url: url.into() }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Listing { scope, path } => write!(f, "listing[{}] {}", scope, path),
            CacheKey::YearFolders { scope, selected } => {
                write!(f, "years[{}] selected={:?}", scope, selected)
            }
            CacheKey::Articles { scope, year } => write!(f, "articles[{}] {}", scope, year),
            CacheKey::Content { url } => write!(f, "content {}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_differ_by_repository_dimension() {
        let base = RepositoryConfig::default();
        let other_branch = RepositoryConfig {
            branch: "dev".to_string(),
            ..base.clone()
        };
        let other_base = RepositoryConfig {
            base_path: String::new(),
            ..base.clone()
        };

        let keys: HashSet<CacheKey> = [
            CacheKey::articles(&base, "2024"),
            CacheKey::articles(&other_branch, "2024"),
            CacheKey::articles(&other_base, "2024"),
            CacheKey::articles(&base, "2023"),
        ]
        .into_iter()
        .collect();

        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_no_collision_between_string_shapes() {
        // owner "a-b" + repo "c" must not collide with owner "a" + repo "b-c"
        let first = RepositoryConfig {
            owner: "a-b".to_string(),
            repo: "c".to_string(),
            ..Default::default()
        };
        let second = RepositoryConfig {
            owner: "a".to_string(),
            repo: "b-c".to_string(),
            ..Default::default()
        };
        assert_ne!(CacheKey::year_folders(&first), CacheKey::year_folders(&second));
    }

    #[test]
    fn test_year_folder_key_tracks_selection() {
        let mut config = RepositoryConfig::default();
        let unselected = CacheKey::year_folders(&config);
        config.selected_folders = vec!["2024".to_string()];
        assert_ne!(unselected, CacheKey::year_folders(&config));
    }

    #[test]
    fn test_display() {
        let config = RepositoryConfig::default();
        assert_eq!(
            CacheKey::articles(&config, "2025").to_string(),
            "articles[dubuqingfeng/yarb-web3@main:archive] 2025"
        );
    }
}
