//! Gateways for reading pull requests and repository content through Octocrab.
//!
//! The trait is the seam between test discovery and GitHub: discovery only
//! talks to [`PullRequestGateway`], so tests can substitute a mock while the
//! Octocrab implementation handles real HTTP requests.

mod client;
mod error_mapping;
mod http_utils;
mod pull_request;


pub use pull_request::OctocrabGateway;

use async_trait::async_trait;

use crate::github::error::IntakeError;
use crate::github::locator::{PullRequestNumber, RepositoryLocator};
use crate::github::models::{ChangedFilesPage, PullRequest};

/// Gateway that can read pull requests and file content from a repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch the pull request metadata.
    async fn pull_request(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<PullRequest, IntakeError>;

    /// Fetch one page of the pull request's changed files.
    async fn changed_files(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
        page: u32,
        per_page: u8,
    ) -> Result<ChangedFilesPage, IntakeError>;

    /// List every open pull request in the repository.
    async fn open_pull_requests(
        &self,
        repository: &RepositoryLocator,
    ) -> Result<Vec<PullRequest>, IntakeError>;

    /// Download the raw content of `path` at `git_ref`.
    async fn file_content(
        &self,
        repository: &RepositoryLocator,
        path: &str,
        git_ref: &str,
    ) -> Result<String, IntakeError>;
}
