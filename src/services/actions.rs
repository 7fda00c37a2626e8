//! CI operations: workflow runs and per-commit check runs.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::{Page, PaginationLinks, PaginationParams};
use crate::types::{CheckRun, CheckRunsResponse, WorkflowRun, WorkflowRunsResponse};

/// Default page size for workflow run listings.
pub const DEFAULT_RUN_PER_PAGE: u32 = 10;

/// Service for GitHub Actions operations.
pub struct ActionsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> ActionsService<'a> {
    /// Creates a new actions service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists the most recent workflow runs with the default page size.
    pub async fn workflow_runs(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Vec<WorkflowRun>> {
        let page = self
            .workflow_runs_page(owner, repo, 1, DEFAULT_RUN_PER_PAGE)
            .await?;
        Ok(page.into_items())
    }

    /// Lists a page of workflow runs.
    ///
    /// The endpoint wraps results in a `{ total_count, workflow_runs }`
    /// envelope; this unwraps it into a flat page carrying the total.
    pub async fn workflow_runs_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> GitHubResult<Page<WorkflowRun>> {
        let pagination = PaginationParams::new(page, per_page);
        let query = pagination.to_query();

        let response = self
            .client
            .get_response(&format!("/repos/{}/{}/actions/runs", owner, repo), &query)
            .await?;

        let links = PaginationLinks::from_headers(response.headers());
        let envelope: WorkflowRunsResponse = GitHubClient::decode(response).await?;

        Ok(
            Page::new(envelope.workflow_runs, links, pagination.page, pagination.per_page)
                .with_total_count(envelope.total_count),
        )
    }

    /// Lists the check runs attached to a commit.
    pub async fn check_runs(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> GitHubResult<Vec<CheckRun>> {
        let envelope: CheckRunsResponse = self
            .client
            .get(&format!("/repos/{}/{}/commits/{}/check-runs", owner, repo, sha))
            .await?;
        Ok(envelope.check_runs)
    }
}
