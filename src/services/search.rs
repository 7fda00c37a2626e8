//! Full-text search over commits and pull requests, scoped to a single
//! repository.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::SearchResults;
use crate::types::{Commit, PullRequest};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

/// Search query parameters.
#[derive(Debug, Clone, Serialize)]
struct SearchParams {
    q: String,
    per_page: u32,
}

/// Issue-shaped search hit; the PR search only needs the number to hydrate
/// full detail.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSearchItem {
    /// Issue or pull request number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// HTML URL.
    pub html_url: String,
}

/// Service for search operations.
pub struct SearchService<'a> {
    client: &'a GitHubClient,
}

impl<'a> SearchService<'a> {
    /// Creates a new search service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Searches commits in a repository.
    pub async fn commits(
        &self,
        owner: &str,
        repo: &str,
        query: &str,
    ) -> GitHubResult<SearchResults<Commit>> {
        let params = SearchParams {
            q: format!("{} repo:{}/{}", query, owner, repo),
            per_page: 30,
        };
        self.client.get_with_params("/search/commits", &params).await
    }

    /// Searches pull requests in a repository.
    ///
    /// Search hits are issue-shaped, so each hit is hydrated with a
    /// follow-up pull-request fetch; hits whose follow-up fails are dropped
    /// rather than failing the whole search.
    pub async fn pull_requests(
        &self,
        owner: &str,
        repo: &str,
        query: &str,
    ) -> GitHubResult<Vec<PullRequest>> {
        let params = SearchParams {
            q: format!("{} repo:{}/{} is:pr", query, owner, repo),
            per_page: 30,
        };
        let results: SearchResults<IssueSearchItem> =
            self.client.get_with_params("/search/issues", &params).await?;

        let pulls = self.client.pull_requests();
        let fetches = results
            .items
            .iter()
            .map(|item| pulls.get(owner, repo, item.number));

        Ok(join_all(fetches)
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(pr) => Some(pr),
                Err(e) => {
                    tracing::debug!(error = %e, "dropping search hit that failed to hydrate");
                    None
                }
            })
            .collect())
    }
}
