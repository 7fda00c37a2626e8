//! Commit operations, including the bounded commit-plus-files composite
//! used by activity feeds.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::{Page, PaginationParams};
use crate::types::{Commit, CommitDetail, CommitWithFiles, FileChange};
use futures::future::join_all;

/// Default page size for commit listings.
pub const DEFAULT_COMMIT_PER_PAGE: u32 = 20;

/// Default size of the recent-commits composite fetch.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// File detail is hydrated for at most this many commits per composite
/// fetch, to bound request fan-out against the rate limit.
const FILE_DETAIL_LIMIT: usize = 5;

/// Service for commit operations.
pub struct CommitsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> CommitsService<'a> {
    /// Creates a new commits service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists the most recent commits with the default page size.
    pub async fn list(&self, owner: &str, repo: &str) -> GitHubResult<Vec<Commit>> {
        let page = self
            .list_page(owner, repo, 1, DEFAULT_COMMIT_PER_PAGE)
            .await?;
        Ok(page.into_items())
    }

    /// Lists a page of commits.
    pub async fn list_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> GitHubResult<Page<Commit>> {
        self.client
            .get_page(
                &format!("/repos/{}/{}/commits", owner, repo),
                Vec::new(),
                &PaginationParams::new(page, per_page),
            )
            .await
    }

    /// Gets the changed files of a single commit. Commits whose detail
    /// response omits the file list yield an empty vector.
    pub async fn files(&self, owner: &str, repo: &str, sha: &str) -> GitHubResult<Vec<FileChange>> {
        let detail: CommitDetail = self
            .client
            .get(&format!("/repos/{}/{}/commits/{}", owner, repo, sha))
            .await?;
        Ok(detail.files)
    }

    /// Fetches the recent commits and hydrates file detail for the first few
    /// of them.
    ///
    /// A failed file fetch degrades that commit to an empty file list rather
    /// than failing the whole operation; commits beyond the hydration bound
    /// are returned with empty files by design.
    pub async fn recent_with_files(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Vec<CommitWithFiles>> {
        let commits = self
            .list_page(owner, repo, 1, DEFAULT_RECENT_LIMIT)
            .await?
            .into_items();

        let detail_fetches = commits
            .iter()
            .take(FILE_DETAIL_LIMIT)
            .map(|commit| self.files(owner, repo, &commit.sha));
        let mut details = join_all(detail_fetches).await.into_iter();

        Ok(commits
            .into_iter()
            .map(|commit| {
                let files = match details.next() {
                    Some(Ok(files)) => files,
                    Some(Err(e)) => {
                        tracing::debug!(sha = %commit.sha, error = %e, "file detail fetch failed");
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                CommitWithFiles { commit, files }
            })
            .collect())
    }
}
