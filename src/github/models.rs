//! Data models for pull requests and their changed files.
//!
//! Types prefixed with `Api` are internal deserialisation targets that convert
//! into public domain types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::pagination::PageInfo;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Open and accepting builds.
    #[default]
    Open,
    /// Closed or merged.
    Closed,
}

impl PullRequestState {
    /// Returns the API string for this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Snapshot of pull request metadata used for discovery and filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Open or closed.
    pub state: PullRequestState,
    /// Author login if present.
    pub author: Option<String>,
    /// Title of the pull request.
    pub title: Option<String>,
    /// Label names.
    pub labels: BTreeSet<String>,
    /// Milestone title if one is assigned.
    pub milestone: Option<String>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Test-merge commit GitHub computed for the pull request.
    pub merge_commit_sha: Option<String>,
    /// Whether the pull request is a draft.
    pub draft: bool,
    /// HTML URL for displaying to a user.
    pub html_url: Option<String>,
}

impl PullRequest {
    /// Returns true when the pull request is closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, PullRequestState::Closed)
    }
}

/// A file touched by a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Repository-relative path.
    pub path: String,
}

/// One page of changed files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFilesPage {
    /// Files on this page.
    pub files: Vec<ChangedFile>,
    /// Position and navigation state.
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) number: u64,
    pub(super) state: PullRequestState,
    pub(super) title: Option<String>,
    pub(super) html_url: Option<String>,
    pub(super) user: Option<ApiUser>,
    #[serde(default)]
    pub(super) labels: Vec<ApiLabel>,
    pub(super) milestone: Option<ApiMilestone>,
    pub(super) created_at: Option<DateTime<Utc>>,
    pub(super) updated_at: Option<DateTime<Utc>>,
    pub(super) merge_commit_sha: Option<String>,
    #[serde(default)]
    pub(super) draft: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiLabel {
    pub(super) name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiMilestone {
    pub(super) title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiChangedFile {
    pub(super) filename: String,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            number: value.number,
            state: value.state,
            author: value.user.and_then(|user| user.login),
            title: value.title,
            labels: value.labels.into_iter().map(|label| label.name).collect(),
            milestone: value.milestone.and_then(|milestone| milestone.title),
            created_at: value.created_at,
            updated_at: value.updated_at,
            merge_commit_sha: value.merge_commit_sha.filter(|sha| !sha.is_empty()),
            draft: value.draft,
            html_url: value.html_url,
        }
    }
}

impl From<ApiChangedFile> for ChangedFile {
    fn from(value: ApiChangedFile) -> Self {
        Self {
            path: value.filename,
        }
    }
}
