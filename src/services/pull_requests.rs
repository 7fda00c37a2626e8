//! Pull request operations.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::{Page, PaginationParams};
use crate::types::PullRequest;
use std::fmt;

/// Default page size for pull request listings.
pub const DEFAULT_PULL_PER_PAGE: u32 = 20;

/// State filter for pull request listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    /// Open pull requests.
    #[default]
    Open,
    /// Closed pull requests.
    Closed,
    /// All pull requests.
    All,
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Service for pull request operations.
pub struct PullRequestsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> PullRequestsService<'a> {
    /// Creates a new pull requests service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists open pull requests, most recently updated first.
    pub async fn list_open(&self, owner: &str, repo: &str) -> GitHubResult<Vec<PullRequest>> {
        let page = self
            .list_page(owner, repo, StateFilter::Open, 1, DEFAULT_PULL_PER_PAGE)
            .await?;
        Ok(page.into_items())
    }

    /// Lists a page of pull requests in the given state, most recently
    /// updated first.
    pub async fn list_page(
        &self,
        owner: &str,
        repo: &str,
        state: StateFilter,
        page: u32,
        per_page: u32,
    ) -> GitHubResult<Page<PullRequest>> {
        let query = vec![
            ("state".to_string(), state.to_string()),
            ("sort".to_string(), "updated".to_string()),
            ("direction".to_string(), "desc".to_string()),
        ];

        self.client
            .get_page(
                &format!("/repos/{}/{}/pulls", owner, repo),
                query,
                &PaginationParams::new(page, per_page),
            )
            .await
    }

    /// Gets a single pull request.
    pub async fn get(&self, owner: &str, repo: &str, number: u64) -> GitHubResult<PullRequest> {
        self.client
            .get(&format!("/repos/{}/{}/pulls/{}", owner, repo, number))
            .await
    }
}
