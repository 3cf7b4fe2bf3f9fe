//! Upstream content provider
//!
//! The content service only talks to GitHub through the [`ContentSource`]
//! trait, so tests can substitute an in-memory source.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: paced requests, status classification and URL construction

use async_trait::async_trait;
use url::Url;

use crate::app::models::{DirectoryEntry, RepositoryConfig};
use crate::errors::{ConfigError, ConfigResult, FetchError, FetchResult};

pub mod config;
pub mod http;

pub use config::ClientConfig;

use http::HttpHandler;

/// Read access to a repository's directory listings and raw file bodies
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// List the directory at `path` (already resolved against the base path)
    async fn list_directory(
        &self,
        repo: &RepositoryConfig,
        path: &str,
    ) -> FetchResult<Vec<DirectoryEntry>>;

    /// Fetch the raw body behind a download URL
    async fn fetch_raw(&self, download_url: &str) -> FetchResult<String>;
}

/// [`ContentSource`] backed by the GitHub contents API
#[derive(Debug)]
pub struct GitHubClient {
    http_handler: HttpHandler,
    api_base: Url,
}

impl GitHubClient {
    /// Creates a client from the given configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API base URL is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: &ClientConfig) -> ConfigResult<Self> {
        let api_base =
            Url::parse(&config.api_base_url).map_err(|e| ConfigError::ValidationFailed {
                errors: vec![format!(
                    "Invalid API base URL {}: {}",
                    config.api_base_url, e
                )],
            })?;
        let client = config.build_http_client()?;
        let http_handler =
            HttpHandler::new(client, config.rate_limit_rps, config.request_timeout)?;

        tracing::info!(
            "Created GitHub client for {} ({} req/s, authenticated: {})",
            api_base,
            config.rate_limit_rps,
            config.api_token.is_some()
        );

        Ok(Self {
            http_handler,
            api_base,
        })
    }

    /// Base URL of the API this client talks to
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }
}

#[async_trait]
impl ContentSource for GitHubClient {
    async fn list_directory(
        &self,
        repo: &RepositoryConfig,
        path: &str,
    ) -> FetchResult<Vec<DirectoryEntry>> {
        let url = http::contents_url(&self.api_base, repo, path)?;
        tracing::debug!("Listing {}", url);
        self.http_handler.get_json(&url).await
    }

    async fn fetch_raw(&self, download_url: &str) -> FetchResult<String> {
        let url = Url::parse(download_url).map_err(|e| FetchError::InvalidUrl {
            url: download_url.to_string(),
            error: e.to_string(),
        })?;
        self.http_handler.get_text(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        // Test that a client builds from the default configuration
        let client = GitHubClient::new(&ClientConfig::default()).unwrap();
        assert_eq!(client.api_base().as_str(), "https://api.github.com/");
    }

    #[test]
    fn test_client_rejects_bad_api_base() {
        let config = ClientConfig {
            api_base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            GitHubClient::new(&config),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_raw_rejects_malformed_url() {
        // Test that a malformed download URL fails before any request is sent
        let client = GitHubClient::new(&ClientConfig::default()).unwrap();
        let result = client.fetch_raw("::not-a-url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
