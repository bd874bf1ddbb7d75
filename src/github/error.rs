//! Error types exposed by the GitHub intake and test discovery layer.

use thiserror::Error;

/// Errors surfaced while parsing input, communicating with GitHub, or
/// discovering tests from a pull request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    /// The provided repository URL or API base could not be parsed.
    #[error("repository URL is invalid: {0}")]
    InvalidUrl(String),

    /// The repository identifier is incomplete.
    #[error("repository must be given as owner/name or https://host/owner/name")]
    MissingPathSegments,

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The authentication token was blank.
    #[error("personal access token must not be blank")]
    MissingToken,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The pull request is closed, so no build can be started for it.
    #[error("cannot start build for closed pull request #{number}")]
    ClosedPullRequest {
        /// Pull request number.
        number: u64,
    },

    /// GitHub has not produced a merge commit for the pull request.
    #[error("pull request #{number} has no merge commit (is there a merge conflict?)")]
    MissingMergeCommit {
        /// Pull request number.
        number: u64,
    },

    /// No changed file survived the skip rules and the file pattern.
    #[error("found no files matching: {pattern}")]
    NoMatchingFiles {
        /// The file pattern that was applied.
        pattern: String,
    },

    /// A user-supplied regular expression could not be compiled.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },
}
