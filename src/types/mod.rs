//! Core data types for the GitHub API surface this crate consumes.
//!
//! These are wire-format mirrors of the upstream JSON; the client does not
//! normalize them beyond what serde defaults provide.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GitHub user (minimal representation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: u64,
    /// Username (login).
    pub login: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Profile URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// GitHub repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Repository ID.
    pub id: u64,
    /// Repository name.
    pub name: String,
    /// Full name (owner/repo).
    pub full_name: String,
    /// Owner information.
    pub owner: User,
    /// Whether the repository is private.
    pub private: bool,
    /// Repository description.
    pub description: Option<String>,
    /// Whether the repository is a fork.
    pub fork: bool,
    /// HTML URL.
    pub html_url: String,
    /// Default branch.
    pub default_branch: String,
    /// Primary language.
    pub language: Option<String>,
    /// Fork count.
    pub forks_count: u32,
    /// Stargazer count.
    pub stargazers_count: u32,
    /// Watcher count.
    pub watchers_count: u32,
    /// Open issue count.
    pub open_issues_count: u32,
    /// Topics.
    #[serde(default)]
    pub topics: Vec<String>,
    /// License information.
    pub license: Option<License>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Last push time.
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Repository license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    /// License key.
    pub key: String,
    /// License name.
    pub name: String,
    /// SPDX ID.
    pub spdx_id: Option<String>,
}

/// GitHub branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
    /// Commit reference.
    pub commit: BranchCommit,
    /// Whether the branch is protected.
    #[serde(default)]
    pub protected: bool,
}

/// Branch commit reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCommit {
    /// Commit SHA.
    pub sha: String,
    /// Commit URL.
    pub url: String,
}

/// Commit list entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA.
    pub sha: String,
    /// Git-level commit data.
    pub commit: GitCommit,
    /// GitHub account of the author, when resolvable.
    pub author: Option<User>,
    /// HTML URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Git-level commit data nested inside a commit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitCommit {
    /// Commit message.
    pub message: String,
    /// Author signature.
    pub author: Option<GitSignature>,
    /// Committer signature.
    pub committer: Option<GitSignature>,
}

/// Name/email/date signature on a git commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSignature {
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Timestamp.
    pub date: DateTime<Utc>,
}

/// A changed file within a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    /// File path.
    pub filename: String,
    /// Change status (added, removed, modified, renamed, ...).
    pub status: String,
    /// Lines added.
    pub additions: u32,
    /// Lines deleted.
    pub deletions: u32,
    /// Total changed lines.
    pub changes: u32,
    /// Unified diff hunk, when the upstream includes one.
    #[serde(default)]
    pub patch: Option<String>,
}

/// Single-commit detail response; only the file list is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    /// Commit SHA.
    pub sha: String,
    /// Changed files. Absent for very large commits.
    #[serde(default)]
    pub files: Vec<FileChange>,
}

/// A commit paired with its changed files.
#[derive(Debug, Clone)]
pub struct CommitWithFiles {
    /// The commit.
    pub commit: Commit,
    /// Changed files; empty when detail was not fetched or failed to fetch.
    pub files: Vec<FileChange>,
}

/// GitHub pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request ID.
    pub id: u64,
    /// Pull request number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: Option<String>,
    /// State (open or closed).
    pub state: PullRequestState,
    /// Whether the PR is a draft.
    #[serde(default)]
    pub draft: bool,
    /// Author.
    pub user: User,
    /// HTML URL.
    pub html_url: String,
    /// Head reference.
    pub head: PullRequestRef,
    /// Base reference.
    pub base: PullRequestRef,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,
    /// Merge time.
    pub merged_at: Option<DateTime<Utc>>,
}

/// Pull request state as reported by the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Open pull request.
    Open,
    /// Closed pull request.
    Closed,
}

/// Head/base reference on a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Branch name.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Commit SHA.
    pub sha: String,
}

/// GitHub Actions workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Run ID.
    pub id: u64,
    /// Workflow name.
    pub name: Option<String>,
    /// Head branch.
    pub head_branch: Option<String>,
    /// Head commit SHA.
    pub head_sha: String,
    /// Run number.
    pub run_number: u64,
    /// Triggering event.
    pub event: String,
    /// Run status.
    pub status: RunStatus,
    /// Run conclusion (set once completed).
    pub conclusion: Option<RunConclusion>,
    /// HTML URL.
    pub html_url: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Status of a workflow or check run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run has completed.
    Completed,
    /// Run is executing.
    InProgress,
    /// Run is queued.
    Queued,
    /// Run is waiting on a deployment gate.
    Waiting,
    /// Run has been requested but not queued.
    Requested,
    /// Run is pending.
    Pending,
    /// Unrecognized status value.
    #[serde(other)]
    Unknown,
}

/// Conclusion of a completed workflow or check run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    /// Run succeeded.
    Success,
    /// Run failed.
    Failure,
    /// Run was cancelled.
    Cancelled,
    /// Run was skipped.
    Skipped,
    /// Neutral result.
    Neutral,
    /// Run timed out.
    TimedOut,
    /// Action required.
    ActionRequired,
    /// Stale run.
    Stale,
    /// Unrecognized conclusion value.
    #[serde(other)]
    Unknown,
}

/// Envelope for the workflow-run list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunsResponse {
    /// Total run count across all pages.
    pub total_count: u64,
    /// Runs in this page.
    pub workflow_runs: Vec<WorkflowRun>,
}

/// Check run attached to a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check run ID.
    pub id: u64,
    /// Check name.
    pub name: String,
    /// Check status.
    pub status: RunStatus,
    /// Check conclusion (set once completed).
    pub conclusion: Option<RunConclusion>,
    /// Start time.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
    /// HTML URL.
    pub html_url: Option<String>,
}

/// Envelope for the check-run list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunsResponse {
    /// Total check count.
    #[serde(default)]
    pub total_count: u64,
    /// Check runs.
    pub check_runs: Vec<CheckRun>,
}

/// Per-contributor commit statistics.
///
/// Computed asynchronously by the upstream; an empty list from the
/// contributors accessor may mean "still computing" rather than "none".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorStats {
    /// The contributor, when resolvable to an account.
    pub author: Option<User>,
    /// Total commit count.
    pub total: u64,
    /// Weekly activity buckets.
    #[serde(default)]
    pub weeks: Vec<WeeklyStats>,
}

/// One week of contributor activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyStats {
    /// Week start (unix seconds).
    pub w: i64,
    /// Additions.
    pub a: u64,
    /// Deletions.
    pub d: u64,
    /// Commits.
    pub c: u64,
}

/// Language byte counts, ordered by language name.
pub type LanguageStats = BTreeMap<String, u64>;
