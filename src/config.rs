//! Application configuration file support
//!
//! Settings are read from a TOML file with one section per component:
//!
//! ```toml
//! [repository]
//! owner = "dubuqingfeng"
//! repo = "yarb-web3"
//! branch = "main"
//! basePath = "archive"
//!
//! [client]
//! request_timeout = "10s"
//! rate_limit_rps = 10
//!
//! [cache]
//! ttl = "30m"
//!
//! [prefetch]
//! window = 2
//!
//! [logging]
//! level = "warn"
//! ```
//!
//! Every field is optional. The `[repository]` section holds the defaults a
//! reset returns to; user overrides made through `config set` live in a
//! separate `repository.toml` next to the configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::models::{RepositoryConfig, RepositoryUpdate};
use crate::app::{settings, CacheConfig, ClientConfig};
use crate::constants::{files, prefetch};
use crate::errors::{ConfigError, ConfigResult};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub repository: RepositoryConfig,
    pub client: ClientConfig,
    pub cache: CacheConfig,
    pub prefetch: PrefetchConfig,
    pub logging: LoggingConfig,
}

/// Background prefetch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Articles warmed on each side of the one being read
    pub window: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            window: prefetch::DEFAULT_WINDOW,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file, falling back to defaults
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// location is used when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed
    pub async fn load(config_file_override: Option<&Path>) -> ConfigResult<Self> {
        let path = match config_file_override {
            Some(path) => path.to_path_buf(),
            None => match Self::default_config_path() {
                Ok(path) => path,
                Err(ConfigError::NoConfigDir) => {
                    debug!("No user config directory, using defaults");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e),
            },
        };

        if config_file_override.is_none() && !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from_file(&path).await
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Write configuration to a TOML file, creating parent directories
    pub async fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(path, self.to_toml()?)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(files::APP_DIR_NAME)
            .join(files::CONFIG_FILE_NAME))
    }

    /// File holding the user's repository overrides
    ///
    /// Lives next to the configuration file in use.
    pub fn repository_overrides_path(config_file_override: Option<&Path>) -> ConfigResult<PathBuf> {
        let config_path = match config_file_override {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };
        let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        Ok(dir.join(files::REPOSITORY_FILE_NAME))
    }

    /// Check the configuration for values the application cannot run with
    pub fn validate(&self) -> Vec<String> {
        let mut errors = settings::validate(&RepositoryUpdate::from(&self.repository));

        if self.client.rate_limit_rps == 0 {
            errors.push("client.rate_limit_rps must be greater than 0".to_string());
        }
        if self.client.request_timeout.is_zero() {
            errors.push("client.request_timeout must be greater than 0".to_string());
        }
        if url::Url::parse(&self.client.api_base_url).is_err() {
            errors.push(format!(
                "client.api_base_url is not a valid URL: {}",
                self.client.api_base_url
            ));
        }
        if self.cache.ttl.is_zero() {
            errors.push("cache.ttl must be greater than 0".to_string());
        }

        errors
    }
}
