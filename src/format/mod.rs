//! Presentation helpers: relative timestamps and CI run badges.

use crate::types::{RunConclusion, RunStatus};
use chrono::{DateTime, Utc};

/// Formats a timestamp relative to `now`.
///
/// Under a minute reads "just now"; then minutes, hours, and days; anything
/// 30 days or older falls back to an absolute date. Thresholds are strict:
/// exactly 60 seconds is already "1m ago".
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds();

    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else if seconds < 2_592_000 {
        format!("{}d ago", seconds / 86_400)
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}

/// Formats a timestamp relative to the current time.
pub fn relative_time_from_now(timestamp: DateTime<Utc>) -> String {
    relative_time(timestamp, Utc::now())
}

/// Color bucket for rendering a CI run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    /// Successful completion.
    Success,
    /// Failed completion.
    Danger,
    /// Completed with an inconclusive result, or still queued.
    Warning,
    /// Actively running.
    Info,
    /// Cancelled, skipped, or unknown.
    Gray,
}

impl StatusColor {
    /// Stable lowercase name, for CSS classes and the like.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Gray => "gray",
        }
    }
}

/// Maps a run status/conclusion pair to its color bucket.
pub fn status_color(status: RunStatus, conclusion: Option<RunConclusion>) -> StatusColor {
    match status {
        RunStatus::Completed => match conclusion {
            Some(RunConclusion::Success) => StatusColor::Success,
            Some(RunConclusion::Failure) => StatusColor::Danger,
            Some(RunConclusion::Cancelled) | Some(RunConclusion::Skipped) => StatusColor::Gray,
            _ => StatusColor::Warning,
        },
        RunStatus::InProgress => StatusColor::Info,
        RunStatus::Queued => StatusColor::Warning,
        _ => StatusColor::Gray,
    }
}

/// Maps a run status/conclusion pair to its badge icon.
pub fn status_icon(status: RunStatus, conclusion: Option<RunConclusion>) -> char {
    match status {
        RunStatus::Completed => match conclusion {
            Some(RunConclusion::Success) => '✓',
            Some(RunConclusion::Failure) => '✗',
            Some(RunConclusion::Cancelled) => '⊘',
            Some(RunConclusion::Skipped) => '⊝',
            _ => '?',
        },
        RunStatus::InProgress => '⟳',
        RunStatus::Queued => '⋯',
        _ => '·',
    }
}
