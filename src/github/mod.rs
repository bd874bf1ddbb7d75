//! GitHub access for pull request metadata, changed files and file content.
//!
//! This module wraps Octocrab behind the [`PullRequestGateway`] trait and maps
//! its errors into [`IntakeError`] variants, so test discovery and the CLI
//! never see Octocrab internals. Pull request filters used when sweeping every
//! open pull request live in [`filters`].

pub mod error;
pub mod filters;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;

pub use error::IntakeError;
pub use filters::{FilterCriteria, FilterSet, FilterVerdict, PullRequestFilter};
pub use gateway::{OctocrabGateway, PullRequestGateway};
pub use locator::{
    PersonalAccessToken, PullRequestNumber, RepositoryLocator, RepositoryName, RepositoryOwner,
};
pub use models::{ChangedFile, ChangedFilesPage, PullRequest, PullRequestState};
pub use pagination::PageInfo;

#[cfg(test)]
pub use gateway::MockPullRequestGateway;

#[cfg(test)]
mod tests;
