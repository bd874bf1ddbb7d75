//! Top-level error type for the command-line tool.

use thiserror::Error;

use crate::github::IntakeError;
use crate::teamcity::BuildError;

/// Errors surfaced by configuration, discovery, builds and output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TcTestError {
    /// Required configuration is missing or inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// GitHub access or test discovery failed.
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// Build-server access or orchestration failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Nothing to run: no tests were discovered and neither an explicit
    /// pattern nor run-all was given.
    #[error("no tests found for PR #{number}, use TestAcc or --run-all to run all tests")]
    NoTestsDiscovered {
        /// Pull request number.
        number: u64,
    },

    /// Cancellation fired before the pull request was processed.
    #[error("cancelled before processing PR #{number}")]
    Interrupted {
        /// Pull request number.
        number: u64,
    },

    /// Some pull requests, services or builds failed; each failure has
    /// already been reported alongside its output.
    #[error("{failed} of {total} runs failed")]
    RunsFailed {
        /// Units that failed.
        failed: usize,
        /// Units attempted.
        total: usize,
    },

    /// Writing output failed.
    #[error("failed to write output: {message}")]
    Io {
        /// Description of the I/O failure.
        message: String,
    },
}

impl TcTestError {
    /// Convenience constructor for [`TcTestError::Configuration`].
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
