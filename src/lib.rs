//! # gitpulse
//!
//! A resilient GitHub REST API client for repository activity dashboards:
//! - Typed accessors for commits, branches, pull requests, workflow and
//!   check runs, contributor/language insights, and search
//! - Swappable bearer credential
//! - Rate-limit tracking from response headers with subscriber notification
//! - Bounded retry with exponential backoff, secondary-rate-limit and
//!   transient-server-error handling
//! - Link-header pagination
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gitpulse::{GitHubClient, GitHubConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GitHubConfig::builder()
//!         .token("ghp_xxxxxxxxxxxx")
//!         .build()?;
//!
//!     let client = GitHubClient::new(config)?;
//!
//!     let repo = client.repositories().get("rust-lang", "cargo").await?;
//!     println!("{}: {} stars", repo.full_name, repo.stargazers_count);
//!
//!     for commit in client.commits().list("rust-lang", "cargo").await? {
//!         println!("{} {}", &commit.sha[..7], commit.commit.message);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// HTTP client and transport
pub mod client;

// Pagination handling
pub mod pagination;

// API services
pub mod services;

// Resilience patterns
pub mod resilience;

// Pure helpers consumed by UI layers
pub mod format;
pub mod reference;

// Re-exports for convenience
pub use client::{GitHubClient, GitHubClientBuilder, RateLimitSubscription};
pub use config::{GitHubConfig, GitHubConfigBuilder, RetryConfig};
pub use errors::{GitHubError, GitHubErrorKind, GitHubResult, RateLimitInfo};
pub use pagination::{Page, PaginationLinks, PaginationParams, SearchResults};
pub use reference::RepoRef;
pub use services::StateFilter;
pub use types::*;
