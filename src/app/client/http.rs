//! Core HTTP operations with client-side pacing
//!
//! This module provides the request primitives used by the GitHub client:
//! paced GET requests, classification of response statuses into
//! [`FetchError`] kinds, and construction of contents API URLs. Requests are
//! never retried; the caller's failure policy decides what a failure means.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::app::models::RepositoryConfig;
use crate::constants::limits;
use crate::errors::{ConfigError, ConfigResult, FetchError, FetchResult};

/// HTTP operations handler with pacing
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
    request_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and pacing
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use for requests
    /// * `rate_limit_rps` - Requests per second
    /// * `request_timeout` - Timeout the client was built with, for error reporting
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the rate is zero
    pub fn new(client: Client, rate_limit_rps: u32, request_timeout: Duration) -> ConfigResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
            request_timeout,
        })
    }

    /// Builds the rate limiter with the specified rate limit
    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> ConfigResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let rate = NonZeroU32::new(rate_limit_rps).ok_or_else(|| ConfigError::ValidationFailed {
            errors: vec!["Rate limit must be non-zero".to_string()],
        })?;
        Ok(RateLimiter::direct(Quota::per_second(rate)))
    }

    /// Sends a paced GET request and classifies the response status
    ///
    /// # Errors
    ///
    /// Returns `FetchError::NotFound` for 404, `FetchError::RateLimited` for 403
    /// and 429, `FetchError::ServerError` for any other non-success status and
    /// `Timeout`/`Transport` when no response arrives
    pub async fn get_response(&self, url: &Url) -> FetchResult<reqwest::Response> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(
                limits::PACING_JITTER_MS,
            )))
            .await;

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        classify_status(response.status(), url)?;
        tracing::debug!("Fetched {} ({})", url, response.status());
        Ok(response)
    }

    /// Fetches a response body as text
    pub async fn get_text(&self, url: &Url) -> FetchResult<String> {
        let response = self.get_response(url).await?;
        response.text().await.map_err(|e| self.transport_error(e))
    }

    /// Fetches and decodes a JSON response body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> FetchResult<T> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            reason: e.to_string(),
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            tracing::warn!("Request timed out: {}", error);
            FetchError::Timeout {
                seconds: self.request_timeout.as_secs(),
            }
        } else {
            tracing::warn!("Request failed: {}", error);
            FetchError::Transport {
                reason: error.to_string(),
            }
        }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map a response status to the transport outcome
pub fn classify_status(status: StatusCode, url: &Url) -> FetchResult<()> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::NOT_FOUND => Err(FetchError::NotFound {
            url: url.to_string(),
        }),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!("GitHub rate limited request to {} ({})", url, status);
            Err(FetchError::RateLimited {
                status: status.as_u16(),
            })
        }
        _ => Err(FetchError::ServerError {
            status: status.as_u16(),
        }),
    }
}

/// Build `{api}/repos/{owner}/{repo}/contents/{path}?ref={branch}`
///
/// Each path segment is percent-encoded separately; empty segments are
/// dropped, so an empty path addresses the repository root.
pub fn contents_url(api_base: &Url, repo: &RepositoryConfig, path: &str) -> FetchResult<Url> {
    let mut url = api_base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl {
            url: api_base.to_string(),
            error: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"])
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    url.query_pairs_mut().append_pair("ref", &repo.branch);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::config::ClientConfig;

    fn api() -> Url {
        Url::parse("https://api.github.com").unwrap()
    }

    #[tokio::test]
    async fn test_rate_limiter_creation() {
        // Test that rate limiter can be created with valid rate
        let rate_limiter = HttpHandler::build_rate_limiter(5).unwrap();
        rate_limiter.until_ready().await;
    }

    #[test]
    fn test_rate_limiter_zero_fails() {
        // Test that rate limiter creation fails with zero rate
        let result = HttpHandler::build_rate_limiter(0);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_handler_creation() {
        // Test that HttpHandler can be created with valid configuration
        let config = ClientConfig::default();
        let client = config.build_http_client().unwrap();
        let handler = HttpHandler::new(client, 5, config.request_timeout);
        assert!(handler.is_ok());
    }

    #[test]
    fn test_status_classification() {
        // Test that upstream statuses map onto the transport failure kinds
        let url = api();
        assert!(classify_status(StatusCode::OK, &url).is_ok());
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, &url),
            Err(FetchError::NotFound { .. })
        ));
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, &url),
            Err(FetchError::RateLimited { status: 403 })
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, &url),
            Err(FetchError::RateLimited { status: 429 })
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY, &url),
            Err(FetchError::ServerError { status: 502 })
        );
    }

    #[test]
    fn test_contents_url_for_nested_path() {
        let repo = RepositoryConfig::default();
        let url = contents_url(&api(), &repo, "archive/2025").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/dubuqingfeng/yarb-web3/contents/archive/2025?ref=main"
        );
    }

    #[test]
    fn test_contents_url_for_root() {
        let repo = RepositoryConfig {
            base_path: String::new(),
            ..Default::default()
        };
        let url = contents_url(&api(), &repo, "").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/dubuqingfeng/yarb-web3/contents?ref=main"
        );
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        // Test that spaces and query characters stay inside their segment
        let repo = RepositoryConfig {
            branch: "feature/x".to_string(),
            ..Default::default()
        };
        let url = contents_url(&api(), &repo, "my notes/a?b").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/dubuqingfeng/yarb-web3/contents/my%20notes/a%3Fb?ref=feature%2Fx"
        );
    }

    #[test]
    fn test_contents_url_keeps_api_prefix() {
        // Test that an enterprise-style API base keeps its own path prefix
        let base = Url::parse("https://github.example.com/api/v3/").unwrap();
        let url = contents_url(&base, &RepositoryConfig::default(), "archive").unwrap();
        assert_eq!(
            url.as_str(),
            "https://github.example.com/api/v3/repos/dubuqingfeng/yarb-web3/contents/archive?ref=main"
        );
    }
}
