//! Response shapes for the consumed GitHub endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Repository metadata returned by `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    /// Full name in "owner/name" format.
    pub full_name: String,

    /// Repository description, when set.
    #[serde(default)]
    pub description: Option<String>,

    /// Default branch name (e.g., "main").
    #[serde(default)]
    pub default_branch: Option<String>,

    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,

    /// Browser URL of the repository.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Outcome of a connection test. Connection testing never fails with an
/// error; callers always receive one of these two variants.
#[derive(Debug, Clone)]
pub enum ConnectionStatus {
    /// The repository is reachable with the current credentials.
    Connected {
        /// Metadata of the reachable repository.
        repository: RepositoryInfo,
    },

    /// The repository could not be reached.
    Failed {
        /// Human-readable reason.
        reason: String,
    },
}

impl ConnectionStatus {
    /// Returns true when the repository was reachable.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Identity of an issue created through the panel.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    /// Issue number within the repository.
    pub number: u64,

    /// Browser URL of the issue.
    pub html_url: String,
}

/// Lifecycle status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    /// Any status this client does not model (e.g. "waiting").
    #[serde(other)]
    Other,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Queued => "queued",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Other => "unknown",
        };
        f.write_str(label)
    }
}

/// Terminal outcome of a completed workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    #[serde(other)]
    Other,
}

impl fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed out",
            Self::ActionRequired => "action required",
            Self::Neutral => "neutral",
            Self::Other => "unknown",
        };
        f.write_str(label)
    }
}

/// A workflow run, as mirrored from the provider. Owned entirely by the
/// remote system; this client only displays a snapshot per poll.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    /// Run identifier. Render logic keys updates on this, never on
    /// completion order.
    pub id: u64,

    /// Display name of the workflow.
    #[serde(default)]
    pub name: Option<String>,

    /// Lifecycle status.
    pub status: RunStatus,

    /// Terminal outcome, present once completed.
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,

    /// Branch the run executed on.
    #[serde(default)]
    pub head_branch: Option<String>,

    /// Head commit hash.
    #[serde(default)]
    pub head_sha: Option<String>,

    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Last-update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// Dispatch inputs, when the run was triggered manually.
    #[serde(default)]
    pub inputs: Option<serde_json::Value>,

    /// Browser URL of the run.
    #[serde(default)]
    pub html_url: Option<String>,
}

impl WorkflowRun {
    /// Returns a short head-commit hash for display.
    #[must_use]
    pub fn short_sha(&self) -> Option<&str> {
        self.head_sha.as_deref().map(|sha| &sha[..sha.len().min(7)])
    }
}

/// Page of workflow runs.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunList {
    /// Total runs matching the query, across all pages.
    #[serde(default)]
    pub total_count: u64,

    /// Runs in this page.
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRun>,
}

/// `GET /contents/...` response. Only the fields the decoder needs.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileContents {
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub encoding: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_run_with_unknown_fields() {
        let run: WorkflowRun = serde_json::from_str(
            r#"{
                "id": 42,
                "name": "Manual Image Sync",
                "status": "in_progress",
                "conclusion": null,
                "head_branch": "main",
                "head_sha": "0123456789abcdef",
                "created_at": "2024-05-01T12:00:00Z",
                "updated_at": "2024-05-01T12:01:00Z",
                "run_attempt": 1
            }"#,
        )
        .unwrap();

        assert_eq!(run.id, 42);
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(run.conclusion.is_none());
        assert_eq!(run.short_sha(), Some("0123456"));
    }

    #[test]
    fn unmodeled_status_maps_to_other() {
        let run: WorkflowRun =
            serde_json::from_str(r#"{"id": 1, "status": "waiting"}"#).unwrap();
        assert_eq!(run.status, RunStatus::Other);
    }

    #[test]
    fn conclusion_labels() {
        assert_eq!(RunConclusion::Success.to_string(), "success");
        assert_eq!(RunConclusion::TimedOut.to_string(), "timed out");
    }
}
