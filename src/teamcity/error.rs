//! Errors raised while talking to the build server or waiting on builds.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::models::BuildId;
use crate::http::HttpError;

/// Lifecycle phase whose budget was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Waiting in the build queue.
    Queued,
    /// Executing on an agent.
    Running,
}

impl fmt::Display for PollPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Queued => "queued",
            Self::Running => "running",
        })
    }
}

/// Errors from build-server operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The server value is not a usable URL.
    #[error("invalid build server '{server}': {message}")]
    InvalidServer {
        /// Value as configured.
        server: String,
        /// Parser message.
        message: String,
    },

    /// An extra build property is not a `KEY=VALUE` pair.
    #[error("unable to parse build property '{property}': missing =")]
    InvalidProperty {
        /// Offending entry.
        property: String,
    },

    /// The request could not be completed.
    #[error("build server request failed: {0}")]
    Network(#[from] HttpError),

    /// The server answered with a status the operation does not handle.
    #[error("{operation} returned HTTP status {status}")]
    UnexpectedStatus {
        /// Operation being performed.
        operation: &'static str,
        /// Returned status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("unable to decode {operation} response: {message}")]
    Decode {
        /// Operation being performed.
        operation: &'static str,
        /// Decoder message.
        message: String,
    },

    /// The build is neither running, finished nor queued.
    #[error("no build ID {build_id} found in running builds or queue")]
    BuildNotFound {
        /// Requested build.
        build_id: BuildId,
    },

    /// The log was requested for a build that has not started.
    #[error("build {build_id} still queued, check results later")]
    BuildStillQueued {
        /// Requested build.
        build_id: BuildId,
    },

    /// No build matched the pull request locator.
    #[error("no builds found for PR #{number}")]
    NoBuildsForPullRequest {
        /// Pull request number.
        number: u64,
    },

    /// A polling budget was exceeded.
    #[error("timeout waiting for build {build_id}: {phase} for {}s", .elapsed.as_secs())]
    Timeout {
        /// Build being polled.
        build_id: BuildId,
        /// Phase whose budget ran out.
        phase: PollPhase,
        /// Time accumulated in that phase.
        elapsed: Duration,
    },

    /// Cancellation fired before the build was queued.
    #[error("cancelled before queueing a build of {build_type_id}")]
    NotQueued {
        /// Build configuration that was not triggered.
        build_type_id: String,
    },

    /// Waiting was interrupted.
    #[error("waiting for build {build_id} was cancelled")]
    Cancelled {
        /// Build being polled.
        build_id: BuildId,
    },
}
