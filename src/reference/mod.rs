//! Free-text repository reference parsing.

use url::Url;

/// An `owner/repo` pair parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoRef {
    /// Parses free text into an owner/repo pair.
    ///
    /// Accepts bare `owner/repo`, `http(s)` URLs (optionally with a
    /// trailing `.git` or extra path segments such as `/tree/main`), and
    /// tolerates surrounding whitespace. Returns `None` for anything
    /// without exactly an owner and a repo segment.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            return Self::parse_url(input);
        }

        let mut segments = input.split('/');
        let owner = segments.next()?;
        let repo = segments.next()?;
        if owner.is_empty() || repo.is_empty() || segments.next().is_some() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            repo: strip_git_suffix(repo).to_string(),
        })
    }

    fn parse_url(input: &str) -> Option<Self> {
        let url = Url::parse(input).ok()?;
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

        let owner = segments.next()?;
        let repo = segments.next()?;
        // Anything after the repo segment (/tree/main, /pull/7, ...) is
        // dropped.

        Some(Self {
            owner: owner.to_string(),
            repo: strip_git_suffix(repo).to_string(),
        })
    }

    /// Formats back to `owner/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn strip_git_suffix(repo: &str) -> &str {
    repo.strip_suffix(".git").unwrap_or(repo)
}
