//! Configuration types for the gitpulse client.

use crate::errors::{GitHubError, GitHubResult};
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = "gitpulse-dashboard/0.1.0";

/// Retry configuration.
///
/// `max_retries` counts retries after the first attempt, so a request makes
/// at most `max_retries + 1` attempts.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    /// Initial backoff delay.
    pub initial_backoff: Duration,
    /// Maximum backoff delay.
    pub max_backoff: Duration,
    /// Backoff multiplier per attempt.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL.
    pub base_url: String,
    /// User-Agent header.
    pub user_agent: String,
    /// Bearer credential to start with, if any. Swappable at runtime via
    /// [`crate::GitHubClient::set_token`].
    pub token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }
}

impl GitHubConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GitHubConfigBuilder {
        GitHubConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GitHubResult<()> {
        if self.base_url.is_empty() {
            return Err(GitHubError::configuration("base_url must not be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(GitHubError::configuration(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        if self.user_agent.is_empty() {
            return Err(GitHubError::configuration("user_agent must not be empty"));
        }
        if self.retry.multiplier < 1.0 {
            return Err(GitHubError::configuration(
                "retry multiplier must be at least 1.0",
            ));
        }
        Ok(())
    }
}

/// Builder for [`GitHubConfig`].
#[derive(Debug, Default)]
pub struct GitHubConfigBuilder {
    config: GitHubConfig,
}

impl GitHubConfigBuilder {
    /// Creates a new builder with defaults.
    pub fn new() -> Self {
        Self {
            config: GitHubConfig::default(),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Sets the initial token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Sets the retry configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Disables retries.
    pub fn no_retry(mut self) -> Self {
        self.config.retry = RetryConfig::disabled();
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> GitHubResult<GitHubConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
