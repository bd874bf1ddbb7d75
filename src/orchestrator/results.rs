//! Test result extraction from build logs.

use crate::teamcity::{Build, BuildError, BuildId, BuildState};

const RESULT_MARKERS: [&str; 3] = ["--- PASS:", "--- FAIL:", "--- SKIP:"];

/// Returns the log lines reporting a test outcome, in log order.
///
/// ```
/// use tctest::orchestrator::result_lines;
///
/// let log = "=== RUN   TestAccFoo\n    --- PASS: TestAccFoo (1.00s)\nPASS\n";
/// assert_eq!(result_lines(log), vec!["    --- PASS: TestAccFoo (1.00s)"]);
/// ```
#[must_use]
pub fn result_lines(log: &str) -> Vec<String> {
    log.lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            RESULT_MARKERS
                .iter()
                .any(|marker| trimmed.starts_with(marker))
        })
        .map(ToOwned::to_owned)
        .collect()
}

/// Whether the results cover the whole build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// The build had finished when the log was read.
    Complete,
    /// The build was still in `state` and the caller chose not to wait.
    Incomplete {
        /// State observed before reading the log.
        state: BuildState,
    },
}

/// Filtered results of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResults {
    /// Build the log belongs to.
    pub build_id: BuildId,
    /// PASS/FAIL/SKIP lines.
    pub lines: Vec<String>,
    /// Completeness marker.
    pub completeness: Completeness,
}

impl BuildResults {
    /// Returns true when the build had finished.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.completeness, Completeness::Complete)
    }
}

/// A pull request build with its results or the reason they are missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Build as listed.
    pub build: Build,
    /// Results for the build.
    pub outcome: Result<BuildResults, BuildError>,
}
