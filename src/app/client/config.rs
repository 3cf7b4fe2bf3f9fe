//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used against the GitHub contents API and raw download URLs.

use std::env;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{env as env_constants, github, http, limits};
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the GitHub HTTP client
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// GitHub REST API base URL
    pub api_base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Request timeout; a request exceeding it fails as a transport error
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of idle connections per host
    pub pool_max_per_host: usize,
    /// Client-side pacing (requests per second)
    pub rate_limit_rps: u32,
    /// Static API token, never written to disk
    #[serde(skip)]
    pub api_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: github::API_BASE_URL.to_string(),
            user_agent: http::USER_AGENT.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            api_token: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_per_host", &self.pool_max_per_host)
            .field("rate_limit_rps", &self.rate_limit_rps)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ClientConfig {
    /// Pick up the API token from the `GITHUB_TOKEN` environment variable
    ///
    /// A blank value is treated as absent.
    pub fn with_token_from_env(mut self) -> Self {
        self.api_token = env::var(env_constants::GITHUB_TOKEN)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        if self.api_token.is_some() {
            tracing::debug!("Using GitHub API token from environment");
        }
        self
    }

    /// Builds the HTTP client with the specified configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the token is not a valid header value or the
    /// client cannot be constructed
    pub fn build_http_client(&self) -> ConfigResult<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(github::ACCEPT));

        if let Some(token) = &self.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ConfigError::ValidationFailed {
                    errors: vec![format!(
                        "{} contains characters not allowed in an HTTP header",
                        env_constants::GITHUB_TOKEN
                    )],
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut client_builder = Client::builder()
            .default_headers(headers)
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        Ok(client_builder.build()?)
    }
}
