//! Repository operations: metadata, branches, contributor and language
//! insights.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::{Page, PaginationParams};
use crate::types::{Branch, ContributorStats, LanguageStats, Repository};
use reqwest::StatusCode;

/// Default page size for branch listings.
pub const DEFAULT_BRANCH_PER_PAGE: u32 = 30;

/// Service for repository operations.
pub struct RepositoriesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepositoriesService<'a> {
    /// Creates a new repositories service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Gets a repository.
    pub async fn get(&self, owner: &str, repo: &str) -> GitHubResult<Repository> {
        self.client.get(&format!("/repos/{}/{}", owner, repo)).await
    }

    /// Lists the first page of branches at the default page size.
    pub async fn list_branches(&self, owner: &str, repo: &str) -> GitHubResult<Vec<Branch>> {
        let page = self
            .list_branches_page(owner, repo, 1, DEFAULT_BRANCH_PER_PAGE)
            .await?;
        Ok(page.into_items())
    }

    /// Lists a page of branches.
    pub async fn list_branches_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> GitHubResult<Page<Branch>> {
        self.client
            .get_page(
                &format!("/repos/{}/{}/branches", owner, repo),
                Vec::new(),
                &PaginationParams::new(page, per_page),
            )
            .await
    }

    /// Gets per-contributor commit statistics.
    ///
    /// The upstream computes these asynchronously and answers 202 with no
    /// usable body until they are ready; that case returns an empty list so
    /// callers can retry later without treating it as a failure.
    pub async fn contributors(&self, owner: &str, repo: &str) -> GitHubResult<Vec<ContributorStats>> {
        let response = self
            .client
            .get_response(&format!("/repos/{}/{}/stats/contributors", owner, repo), &[])
            .await?;

        if response.status() == StatusCode::ACCEPTED {
            tracing::debug!(owner, repo, "contributor stats still computing");
            return Ok(Vec::new());
        }

        GitHubClient::decode(response).await
    }

    /// Gets language byte counts for a repository.
    pub async fn languages(&self, owner: &str, repo: &str) -> GitHubResult<LanguageStats> {
        self.client
            .get(&format!("/repos/{}/{}/languages", owner, repo))
            .await
    }
}
