//! GitHub API client: request execution, credential handling, retry glue,
//! and rate-limit observation.

use crate::config::GitHubConfig;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult, RateLimitInfo};
use crate::pagination::{Page, PaginationLinks, PaginationParams};
use crate::resilience::{RateLimitWatch, RetryExecutor};
use crate::services::*;
use chrono::DateTime;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;

/// Versioned JSON media type sent on every request.
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Upstream error response body.
#[derive(Debug, serde::Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// GitHub API client.
///
/// One explicitly constructed instance is meant to be shared (it is cheap to
/// wrap in an [`Arc`]); the credential is swappable at any time without
/// affecting in-flight requests.
pub struct GitHubClient {
    /// HTTP client.
    http: Client,
    /// Configuration.
    config: GitHubConfig,
    /// Current bearer credential.
    token: RwLock<Option<SecretString>>,
    /// Retry executor for transient failures.
    retry: RetryExecutor,
    /// Last-observed rate limit state plus subscribers.
    rate_limit: Arc<RateLimitWatch>,
}

impl GitHubClient {
    /// Creates a new client.
    pub fn new(config: GitHubConfig) -> GitHubResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                GitHubError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let retry = RetryExecutor::new(
            config.retry.max_retries,
            config.retry.initial_backoff,
            config.retry.max_backoff,
            config.retry.multiplier,
        );

        let token = RwLock::new(config.token.clone().map(SecretString::new));

        Ok(Self {
            http,
            config,
            token,
            retry,
            rate_limit: Arc::new(RateLimitWatch::new()),
        })
    }

    /// Creates a new client builder.
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Replaces the credential used on all subsequent requests.
    ///
    /// In-flight requests keep the credential they started with.
    pub fn set_token(&self, token: Option<&str>) {
        let mut guard = self.token.write().unwrap_or_else(|p| p.into_inner());
        *guard = token.map(|t| SecretString::new(t.to_string()));
    }

    /// Returns the last-observed rate limit state, or `None` before any
    /// response has carried rate-limit headers.
    pub fn rate_limit_info(&self) -> Option<RateLimitInfo> {
        self.rate_limit.latest()
    }

    /// Registers a listener invoked synchronously on every response that
    /// carries rate-limit headers, unchanged values included.
    ///
    /// The listener stays registered for the lifetime of the returned
    /// handle; it is removed by [`RateLimitSubscription::unsubscribe`] or
    /// when the handle is dropped.
    pub fn on_rate_limit_change<F>(&self, listener: F) -> RateLimitSubscription
    where
        F: Fn(&RateLimitInfo) + Send + Sync + 'static,
    {
        let id = self.rate_limit.subscribe(Arc::new(listener));
        RateLimitSubscription {
            watch: Arc::downgrade(&self.rate_limit),
            id,
        }
    }

    // Service accessors

    /// Gets the repositories service.
    pub fn repositories(&self) -> RepositoriesService {
        RepositoriesService::new(self)
    }

    /// Gets the commits service.
    pub fn commits(&self) -> CommitsService {
        CommitsService::new(self)
    }

    /// Gets the pull requests service.
    pub fn pull_requests(&self) -> PullRequestsService {
        PullRequestsService::new(self)
    }

    /// Gets the actions service.
    pub fn actions(&self) -> ActionsService {
        ActionsService::new(self)
    }

    /// Gets the search service.
    pub fn search(&self) -> SearchService {
        SearchService::new(self)
    }

    // HTTP plumbing

    /// Makes a GET request and decodes the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> GitHubResult<T> {
        let response = self.get_response(path, &[]).await?;
        Self::decode(response).await
    }

    /// Makes a GET request with serialized query parameters.
    pub(crate) async fn get_with_params<T: DeserializeOwned, P: Serialize>(
        &self,
        path: &str,
        params: &P,
    ) -> GitHubResult<T> {
        let query_string = serde_urlencoded::to_string(params).map_err(|e| {
            GitHubError::new(
                GitHubErrorKind::InvalidParameter,
                format!("Failed to serialize parameters: {}", e),
            )
        })?;

        let url = if query_string.is_empty() {
            self.build_url(path)
        } else {
            format!("{}?{}", self.build_url(path), query_string)
        };

        let response = self.execute(url).await?;
        Self::decode(response).await
    }

    /// Makes a paginated GET request against a plain-array list endpoint.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(String, String)>,
        pagination: &PaginationParams,
    ) -> GitHubResult<Page<T>> {
        query.extend(pagination.to_query());
        let response = self.get_response(path, &query).await?;

        let links = PaginationLinks::from_headers(response.headers());
        let items: Vec<T> = Self::decode(response).await?;

        Ok(Page::new(items, links, pagination.page, pagination.per_page))
    }

    /// Makes a GET request and returns the raw response.
    ///
    /// Used where the caller needs the status (202 contributors) or the
    /// headers alongside an envelope body.
    pub(crate) async fn get_response(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> GitHubResult<Response> {
        let mut url = self.build_url(path);
        if !query.is_empty() {
            let qs = serde_urlencoded::to_string(query).map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidParameter,
                    format!("Failed to serialize query parameters: {}", e),
                )
            })?;
            url = format!("{}?{}", url, qs);
        }

        self.execute(url).await
    }

    /// Decodes a JSON response body.
    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> GitHubResult<T> {
        response.json().await.map_err(|e| {
            GitHubError::deserialization(format!("Failed to deserialize response: {}", e))
        })
    }

    /// Runs one logical request through the retry executor.
    async fn execute(&self, url: String) -> GitHubResult<Response> {
        // The credential is resolved once per logical call; a token swapped
        // mid-flight does not retroactively reauthorize retries.
        let auth_header = self.auth_header();

        self.retry
            .execute(|| {
                let http = self.http.clone();
                let url = url.clone();
                let auth_header = auth_header.clone();
                let user_agent = self.config.user_agent.clone();
                let watch = self.rate_limit.clone();

                async move {
                    let mut request = http
                        .get(&url)
                        .header(USER_AGENT, &user_agent)
                        .header(ACCEPT, ACCEPT_HEADER);

                    if let Some(ref auth) = auth_header {
                        request = request.header(AUTHORIZATION, auth);
                    }

                    let response = request.send().await.map_err(|e| {
                        if e.is_timeout() {
                            GitHubError::timeout(format!("Request timed out: {}", e))
                                .with_cause(e)
                        } else {
                            GitHubError::new(
                                GitHubErrorKind::ConnectionFailed,
                                format!("Failed to reach the API: {}", e),
                            )
                            .with_cause(e)
                        }
                    })?;

                    // Headers are present on 403/429 too, so publish before
                    // any status branching.
                    let snapshot = Self::extract_rate_limit(response.headers());
                    if let Some(ref info) = snapshot {
                        watch.publish(info.clone());
                    }

                    if response.status().is_success() {
                        return Ok(response);
                    }

                    Err(Self::error_from_response(response, snapshot).await)
                }
            })
            .await
    }

    fn auth_header(&self) -> Option<String> {
        let guard = self.token.read().unwrap_or_else(|p| p.into_inner());
        guard
            .as_ref()
            .map(|t| format!("token {}", t.expose_secret()))
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    fn extract_rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
        fn header_u32(headers: &HeaderMap, name: &str) -> Option<u32> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        }

        let limit = header_u32(headers, "x-ratelimit-limit")?;
        let remaining = header_u32(headers, "x-ratelimit-remaining")?;
        let used = header_u32(headers, "x-ratelimit-used").unwrap_or(limit - remaining.min(limit));

        let reset_timestamp: i64 = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())?;
        let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

        Some(RateLimitInfo {
            limit,
            remaining,
            reset_at,
            used,
        })
    }

    /// Builds the typed error for a non-success response.
    async fn error_from_response(
        response: Response,
        rate_limit: Option<RateLimitInfo>,
    ) -> GitHubError {
        let status = response.status();

        // 403 with an exhausted window is the primary rate limit; surfaced
        // immediately since the reset is minutes to hours away.
        if status == StatusCode::FORBIDDEN {
            if let Some(info) = rate_limit {
                if info.remaining == 0 {
                    tracing::warn!(
                        reset_at = %info.reset_at,
                        "primary rate limit exhausted"
                    );
                    return GitHubError::rate_limited(info);
                }
            }
        }

        // Secondary limit: honor Retry-After when the upstream supplies it.
        let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
            response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
        } else {
            None
        };

        let message = response
            .json::<GitHubErrorResponse>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("error")
                )
            });

        let mut error = GitHubError::from_response(status.as_u16(), message);
        if let Some(wait) = retry_after {
            error = error.with_retry_after(wait);
        }
        error
    }
}

/// Handle scoping a rate-limit listener's registration.
///
/// The listener is removed when the handle is dropped or unsubscribed,
/// whichever comes first. Holds only a weak reference to the client's watch,
/// so an outliving handle never keeps client state alive.
pub struct RateLimitSubscription {
    watch: Weak<RateLimitWatch>,
    id: u64,
}

impl RateLimitSubscription {
    /// Removes the listener. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(watch) = self.watch.upgrade() {
            watch.unsubscribe(self.id);
        }
    }
}

impl Drop for RateLimitSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Builder for [`GitHubClient`].
#[derive(Debug, Default)]
pub struct GitHubClientBuilder {
    config_builder: crate::config::GitHubConfigBuilder,
}

impl GitHubClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: GitHubConfig::builder(),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the initial token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.token(token);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Sets the retry configuration.
    pub fn retry(mut self, retry: crate::config::RetryConfig) -> Self {
        self.config_builder = self.config_builder.retry(retry);
        self
    }

    /// Disables retries.
    pub fn no_retry(mut self) -> Self {
        self.config_builder = self.config_builder.no_retry();
        self
    }

    /// Builds the client.
    pub fn build(self) -> GitHubResult<GitHubClient> {
        let config = self.config_builder.build()?;
        GitHubClient::new(config)
    }
}
