//! Repository configuration provider
//!
//! Holds the active [`RepositoryConfig`] and persists user overrides to a TOML
//! file. The content service reads the configuration through
//! [`RepoConfigStore::get_config`] before building each cache key; it never
//! mutates it mid-request.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::app::models::{RepositoryConfig, RepositoryUpdate};
use crate::constants::repository;
use crate::errors::{ArchiveError, ConfigError, ConfigResult, Result};

/// Source of the active repository configuration
#[derive(Debug)]
pub struct RepoConfigStore {
    defaults: RepositoryConfig,
    current: RwLock<RepositoryConfig>,
    path: Option<PathBuf>,
    /// Serialises read-merge-persist-activate sequences
    updates: Mutex<()>,
}

impl RepoConfigStore {
    /// Store that keeps overrides in memory only
    pub fn in_memory(defaults: RepositoryConfig) -> Self {
        Self {
            current: RwLock::new(defaults.clone()),
            defaults,
            path: None,
            updates: Mutex::new(()),
        }
    }

    /// Store backed by a TOML file
    ///
    /// Fields present in the file override `defaults`; a missing file means
    /// no overrides yet.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed
    pub async fn open(path: impl Into<PathBuf>, defaults: RepositoryConfig) -> ConfigResult<Self> {
        let path = path.into();
        let current = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
            let overrides: RepositoryUpdate = toml::from_str(&content)?;
            debug!("Loaded repository overrides from {}", path.display());
            defaults.merged(&overrides)
        } else {
            defaults.clone()
        };

        Ok(Self {
            defaults,
            current: RwLock::new(current),
            path: Some(path),
            updates: Mutex::new(()),
        })
    }

    /// File the overrides are persisted to, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Snapshot of the active configuration
    pub fn get_config(&self) -> RepositoryConfig {
        self.read().clone()
    }

    /// The configuration a reset returns to
    pub fn defaults(&self) -> &RepositoryConfig {
        &self.defaults
    }

    /// Validate and apply a partial update, then persist it
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::ConfigValidationFailed` if the resulting
    /// configuration is invalid; nothing is changed in that case
    pub async fn update_repo(&self, update: &RepositoryUpdate) -> Result<RepositoryConfig> {
        let _serial = self.updates.lock().await;
        let merged = self.get_config().merged(update);
        let messages = validate(&RepositoryUpdate::from(&merged));
        if !messages.is_empty() {
            return Err(ArchiveError::ConfigValidationFailed { messages });
        }

        self.persist(&merged).await?;
        *self.write() = merged.clone();
        info!(
            "Repository set to {}/{}@{} (base path '{}')",
            merged.owner, merged.repo, merged.branch, merged.base_path
        );
        Ok(merged)
    }

    /// Replace the folder allow-list
    pub async fn update_selected_folders(&self, folders: Vec<String>) -> Result<RepositoryConfig> {
        self.update_repo(&RepositoryUpdate {
            selected_folders: Some(folders),
            ..Default::default()
        })
        .await
    }

    /// Drop all overrides
    pub async fn reset_to_default(&self) -> ConfigResult<()> {
        let _serial = self.updates.lock().await;
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ConfigError::Io {
                        path: path.clone(),
                        source,
                    })
                }
            }
        }
        *self.write() = self.defaults.clone();
        info!("Repository configuration reset to defaults");
        Ok(())
    }

    async fn persist(&self, config: &RepositoryConfig) -> ConfigResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Saved repository configuration to {}", path.display());
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, RepositoryConfig> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RepositoryConfig> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RepoConfigStore {
    fn default() -> Self {
        Self::in_memory(RepositoryConfig::default())
    }
}

/// Check a (possibly partial) configuration
///
/// Absent or blank owner, repo and branch are reported as missing. Owner and
/// repo must consist of ASCII letters, digits, `-`, `_` and `.`.
pub fn validate(config: &RepositoryUpdate) -> Vec<String> {
    let mut errors = Vec::new();
    let is_blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());

    if is_blank(&config.owner) {
        errors.push("Repository owner is required".to_string());
    }
    if is_blank(&config.repo) {
        errors.push("Repository name is required".to_string());
    }
    if is_blank(&config.branch) {
        errors.push("Branch name is required".to_string());
    }

    if matches!(config.owner.as_deref(), Some(owner) if !owner.is_empty() && !is_valid_name(owner))
    {
        errors.push("Repository owner format is invalid".to_string());
    }
    if matches!(config.repo.as_deref(), Some(repo) if !repo.is_empty() && !is_valid_name(repo)) {
        errors.push("Repository name format is invalid".to_string());
    }

    errors
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Interpret a GitHub web URL as a repository location
///
/// Accepts `https://github.com/owner/repo`, `.../tree/branch` and
/// `.../tree/branch/path/to/folder`, with or without a trailing slash. The
/// branch defaults to `main` and the base path to the repository root. The
/// folder allow-list is left untouched.
///
/// # Errors
///
/// Returns `ConfigError::UnrecognisedUrl` for anything else
pub fn parse_github_url(url: &str) -> ConfigResult<RepositoryUpdate> {
    parse_repository_location(url.trim()).ok_or_else(|| ConfigError::UnrecognisedUrl {
        url: url.to_string(),
    })
}

fn parse_repository_location(url: &str) -> Option<RepositoryUpdate> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?
        .strip_prefix("github.com/")?;

    let mut parts = rest.splitn(5, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;

    let (branch, base_path) = match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) | (Some(""), None, _) => (repository::DEFAULT_BRANCH, ""),
        (Some("tree"), Some(branch), None | Some("")) if !branch.is_empty() => (branch, ""),
        (Some("tree"), Some(branch), Some(path)) if !branch.is_empty() => (branch, path),
        _ => return None,
    };

    Some(RepositoryUpdate {
        owner: Some(owner.to_string()),
        repo: Some(repo.to_string()),
        branch: Some(branch.to_string()),
        base_path: Some(base_path.to_string()),
        selected_folders: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn update(owner: &str, repo: &str, branch: &str) -> RepositoryUpdate {
        RepositoryUpdate {
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
            branch: Some(branch.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let config = RepositoryConfig::default();
        assert!(validate(&RepositoryUpdate::from(&config)).is_empty());
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let errors = validate(&RepositoryUpdate::default());
        assert_eq!(
            errors,
            vec![
                "Repository owner is required",
                "Repository name is required",
                "Branch name is required",
            ]
        );
    }

    #[test]
    fn test_validate_reports_bad_names() {
        let errors = validate(&update("bad owner", "repo/x", "main"));
        assert_eq!(
            errors,
            vec![
                "Repository owner format is invalid",
                "Repository name format is invalid",
            ]
        );
    }

    #[test]
    fn test_validate_blank_owner_is_missing_and_malformed() {
        // Whitespace is present but blank, so both rules fire
        let errors = validate(&update("  ", "repo", "main"));
        assert_eq!(
            errors,
            vec![
                "Repository owner is required",
                "Repository owner format is invalid",
            ]
        );
    }

    #[test]
    fn test_parse_plain_repository_url() {
        let parsed = parse_github_url("https://github.com/rust-lang/rust").unwrap();
        assert_eq!(parsed.owner.as_deref(), Some("rust-lang"));
        assert_eq!(parsed.repo.as_deref(), Some("rust"));
        assert_eq!(parsed.branch.as_deref(), Some("main"));
        assert_eq!(parsed.base_path.as_deref(), Some(""));
        assert!(parsed.selected_folders.is_none());

        let trailing = parse_github_url("http://github.com/rust-lang/rust/").unwrap();
        assert_eq!(trailing.repo.as_deref(), Some("rust"));
    }

    #[test]
    fn test_parse_branch_and_path_urls() {
        let parsed = parse_github_url("https://github.com/o/r/tree/dev").unwrap();
        assert_eq!(parsed.branch.as_deref(), Some("dev"));
        assert_eq!(parsed.base_path.as_deref(), Some(""));

        let parsed = parse_github_url("https://github.com/o/r/tree/dev/").unwrap();
        assert_eq!(parsed.branch.as_deref(), Some("dev"));
        assert_eq!(parsed.base_path.as_deref(), Some(""));

        let parsed = parse_github_url("https://github.com/o/r/tree/main/docs/archive").unwrap();
        assert_eq!(parsed.branch.as_deref(), Some("main"));
        assert_eq!(parsed.base_path.as_deref(), Some("docs/archive"));
    }

    #[test]
    fn test_parse_rejects_other_urls() {
        for url in [
            "https://gitlab.com/o/r",
            "https://github.com/o",
            "https://github.com/o/r/blob/main/README.md",
            "github.com/o/r",
            "https://github.com//r",
        ] {
            assert!(
                matches!(parse_github_url(url), Err(ConfigError::UnrecognisedUrl { .. })),
                "{} should be rejected",
                url
            );
        }
    }

    #[tokio::test]
    async fn test_in_memory_update_and_reset() {
        let store = RepoConfigStore::default();

        let updated = store
            .update_repo(&RepositoryUpdate {
                base_path: Some("posts".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.base_path, "posts");
        assert_eq!(updated.owner, repository::DEFAULT_OWNER);
        assert_eq!(store.get_config(), updated);

        store.reset_to_default().await.unwrap();
        assert_eq!(store.get_config(), RepositoryConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_config_unchanged() {
        let store = RepoConfigStore::default();
        let err = store
            .update_repo(&RepositoryUpdate {
                owner: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            ArchiveError::ConfigValidationFailed { messages } => {
                assert_eq!(messages, vec!["Repository owner is required"]);
            }
            other => panic!("Expected ConfigValidationFailed, got {:?}", other),
        }
        assert_eq!(store.get_config(), RepositoryConfig::default());
    }

    #[tokio::test]
    async fn test_file_store_persists_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("repository.toml");

        let store = RepoConfigStore::open(&path, RepositoryConfig::default())
            .await
            .unwrap();
        store
            .update_selected_folders(vec!["2024".to_string(), "2025".to_string()])
            .await
            .unwrap();
        assert!(path.exists());

        // A fresh store sees the persisted overrides
        let reopened = RepoConfigStore::open(&path, RepositoryConfig::default())
            .await
            .unwrap();
        assert_eq!(
            reopened.get_config().selected_folders,
            vec!["2024".to_string(), "2025".to_string()]
        );

        reopened.reset_to_default().await.unwrap();
        assert!(!path.exists());
        assert_eq!(reopened.get_config(), RepositoryConfig::default());
    }

    #[tokio::test]
    async fn test_concurrent_updates_keep_every_field() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("repository.toml");
        let store = RepoConfigStore::open(&path, RepositoryConfig::default())
            .await
            .unwrap();

        let owner = RepositoryUpdate {
            owner: Some("someone".to_string()),
            ..Default::default()
        };
        let branch = RepositoryUpdate {
            branch: Some("dev".to_string()),
            ..Default::default()
        };
        let folders = RepositoryUpdate {
            selected_folders: Some(vec!["2024".to_string()]),
            ..Default::default()
        };
        let (a, b, c) = tokio::join!(
            store.update_repo(&owner),
            store.update_repo(&branch),
            store.update_repo(&folders)
        );
        assert_ok!(a);
        assert_ok!(b);
        assert_ok!(c);

        let expected = RepositoryConfig {
            owner: "someone".to_string(),
            branch: "dev".to_string(),
            selected_folders: vec!["2024".to_string()],
            ..Default::default()
        };
        assert_eq!(store.get_config(), expected);

        // The file holds the combined result, not the last writer's view
        let reopened = RepoConfigStore::open(&path, RepositoryConfig::default())
            .await
            .unwrap();
        assert_eq!(reopened.get_config(), expected);
    }

    #[tokio::test]
    async fn test_partial_file_merges_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("repository.toml");
        tokio::fs::write(&path, "branch = \"gh-pages\"\n").await.unwrap();

        let store = RepoConfigStore::open(&path, RepositoryConfig::default())
            .await
            .unwrap();
        let config = store.get_config();
        assert_eq!(config.branch, "gh-pages");
        assert_eq!(config.repo, repository::DEFAULT_REPO);
    }

    #[tokio::test]
    async fn test_malformed_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("repository.toml");
        tokio::fs::write(&path, "owner = [").await.unwrap();

        let result = RepoConfigStore::open(&path, RepositoryConfig::default()).await;
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }
}
