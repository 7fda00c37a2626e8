//! Error types for the gitpulse client.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Error kinds for categorizing client failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubErrorKind {
    // Configuration errors
    /// Invalid configuration.
    InvalidConfiguration,
    /// Invalid request parameter.
    InvalidParameter,

    // Rate limit errors
    /// Primary (hourly quota) rate limit exhausted.
    RateLimited,
    /// Secondary (abuse detection) rate limit hit.
    SecondaryRateLimit,

    // Client errors
    /// Request validation failed (400).
    ValidationError,
    /// Bad credentials (401).
    BadCredentials,
    /// Access forbidden (403, not rate-limit related).
    Forbidden,
    /// Resource not found (404).
    NotFound,
    /// Unprocessable entity (422).
    UnprocessableEntity,

    // Server errors
    /// Internal server error (500).
    InternalError,
    /// Bad gateway (502).
    BadGateway,
    /// Service unavailable (503).
    ServiceUnavailable,

    // Network errors
    /// Connection failed below the HTTP layer.
    ConnectionFailed,
    /// Request timed out.
    Timeout,

    // Response errors
    /// Failed to deserialize a response body.
    DeserializationError,

    /// Unknown error.
    Unknown,
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration => write!(f, "invalid_configuration"),
            Self::InvalidParameter => write!(f, "invalid_parameter"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::SecondaryRateLimit => write!(f, "secondary_rate_limit"),
            Self::ValidationError => write!(f, "validation_error"),
            Self::BadCredentials => write!(f, "bad_credentials"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::UnprocessableEntity => write!(f, "unprocessable_entity"),
            Self::InternalError => write!(f, "internal_error"),
            Self::BadGateway => write!(f, "bad_gateway"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DeserializationError => write!(f, "deserialization_error"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Rate limit snapshot taken from `X-RateLimit-*` response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window.
    pub limit: u32,
    /// Remaining requests in the current window.
    pub remaining: u32,
    /// Time when the window resets.
    pub reset_at: DateTime<Utc>,
    /// Requests used in the current window.
    pub used: u32,
}

/// Client error with enough structure for callers to branch without
/// string-matching.
#[derive(Error, Debug)]
pub struct GitHubError {
    /// Error kind.
    kind: GitHubErrorKind,
    /// Error message.
    message: String,
    /// HTTP status code.
    status_code: Option<u16>,
    /// Rate limit snapshot at the time of failure (if applicable).
    rate_limit: Option<RateLimitInfo>,
    /// How long the caller should wait before retrying (rate-limit errors).
    retry_after: Option<Duration>,
    /// Underlying low-level cause (network errors).
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        Ok(())
    }
}

impl GitHubError {
    /// Creates a new error.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            rate_limit: None,
            retry_after: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the rate limit snapshot.
    pub fn with_rate_limit(mut self, info: RateLimitInfo) -> Self {
        self.rate_limit = Some(info);
        self
    }

    /// Sets the retry-after duration.
    pub fn with_retry_after(mut self, wait: Duration) -> Self {
        self.retry_after = Some(wait);
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &GitHubErrorKind {
        &self.kind
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the rate limit snapshot.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Returns true if this error was caused by either rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self.kind,
            GitHubErrorKind::RateLimited | GitHubErrorKind::SecondaryRateLimit
        )
    }

    /// Returns how long the caller should wait before retrying.
    ///
    /// Falls back to the time until the rate-limit window resets when no
    /// explicit retry-after was recorded.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after.or_else(|| {
            let rl = self.rate_limit.as_ref()?;
            let now = Utc::now();
            if rl.reset_at > now {
                (rl.reset_at - now).to_std().ok()
            } else {
                None
            }
        })
    }

    /// Returns true if this error is retryable.
    ///
    /// Primary rate-limit exhaustion is not: the reset is minutes to hours
    /// away, so it is surfaced immediately for the caller to handle.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            GitHubErrorKind::SecondaryRateLimit
                | GitHubErrorKind::ConnectionFailed
                | GitHubErrorKind::Timeout
                | GitHubErrorKind::InternalError
                | GitHubErrorKind::BadGateway
                | GitHubErrorKind::ServiceUnavailable
        )
    }

    /// Creates an error from a non-success HTTP status and upstream message.
    pub fn from_response(status: u16, message: String) -> Self {
        Self::new(Self::kind_from_status(status), message).with_status(status)
    }

    /// Maps an HTTP status code to an error kind.
    fn kind_from_status(status: u16) -> GitHubErrorKind {
        match status {
            400 => GitHubErrorKind::ValidationError,
            401 => GitHubErrorKind::BadCredentials,
            403 => GitHubErrorKind::Forbidden,
            404 => GitHubErrorKind::NotFound,
            422 => GitHubErrorKind::UnprocessableEntity,
            429 => GitHubErrorKind::SecondaryRateLimit,
            502 => GitHubErrorKind::BadGateway,
            503 => GitHubErrorKind::ServiceUnavailable,
            500..=599 => GitHubErrorKind::InternalError,
            _ => GitHubErrorKind::Unknown,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidConfiguration, message)
    }

    /// Creates a primary rate-limit error from a snapshot.
    pub fn rate_limited(info: RateLimitInfo) -> Self {
        let wait = (info.reset_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        Self::new(
            GitHubErrorKind::RateLimited,
            "API rate limit exceeded",
        )
        .with_status(403)
        .with_retry_after(wait)
        .with_rate_limit(info)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::Timeout, message)
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::DeserializationError, message)
    }
}
