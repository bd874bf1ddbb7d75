//! Application configuration loaded from CLI, environment, and files.
//!
//! [`TcTestConfig`] merges values from command-line arguments, environment
//! variables, and configuration files using ortho-config's layered approach.
//! The rest of the crate never sees it: the binary converts it once into the
//! plain option structs the library takes (see the conversion methods in
//! [`conversions`]).
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.tctest.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `TCTEST_SERVER`, `TCTEST_BUILD_TYPE_ID`,
//!    ..., plus the legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--server`/`-s`, `--prs`/`-n`, ...
//!
//! # Configuration File
//!
//! ```toml
//! server = "ci.example.com"
//! build_type_id = "TF_AzureRM_PROVIDER"
//! tc_token = "eyJ0eXAi..."
//! repo = "hashicorp/terraform-provider-azurerm"
//! wait = true
//! poll_interval_seconds = 30
//! ```

pub mod conversions;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::error::TcTestError;

/// Operation mode determined by the configured fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Trigger one build for a branch with an explicit test pattern.
    Branch,
    /// Discover tests for the listed pull requests and trigger builds.
    PullRequests,
    /// Discover tests for the listed pull requests and only print them.
    Discover,
    /// Select open pull requests with the filters, then list or run them.
    OpenPullRequests,
    /// Print the test results of one build.
    BuildResults,
    /// Print the test results of the builds of the listed pull requests.
    PullRequestResults,
    /// Nothing selected.
    Unspecified,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// Every field can be given as `--field-name` on the command line,
/// `TCTEST_FIELD_NAME` in the environment, or `field_name` in the
/// configuration file. Boolean fields are not read from the environment
/// because `ortho_config` does not load boolean values from it.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use tctest::TcTestConfig;
///
/// let config = TcTestConfig::load().expect("failed to load configuration");
/// config.validate().expect("configuration should be consistent");
/// let settings = config.poll_settings();
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "TCTEST",
    discovery(
        dotfile_name = ".tctest.toml",
        config_file_name = "tctest.toml",
        app_name = "tctest"
    )
)]
pub struct TcTestConfig {
    /// TeamCity host name or URL. `https://` is assumed when no scheme is
    /// given.
    ///
    /// Can be provided via:
    /// - CLI: `--server <HOST>` or `-s <HOST>`
    /// - Environment: `TCTEST_SERVER`
    /// - Config file: `server = "..."`
    #[ortho_config(cli_short = 's')]
    pub server: Option<String>,

    /// Base TeamCity build configuration ID. Per-service builds append
    /// `_<SERVICE>` to it.
    #[ortho_config(cli_short = 'b')]
    pub build_type_id: Option<String>,

    /// TeamCity access token. Takes precedence over username and password.
    #[ortho_config(cli_short = 'k')]
    pub tc_token: Option<String>,

    /// TeamCity user for basic authentication.
    #[ortho_config(cli_short = 'U')]
    pub username: Option<String>,

    /// TeamCity password for basic authentication.
    #[ortho_config(cli_short = 'P')]
    pub password: Option<String>,

    /// Timeout for each TeamCity HTTP request, in seconds.
    #[ortho_config(cli_short = 'H')]
    pub http_timeout_seconds: u64,

    /// GitHub personal access token.
    ///
    /// Can be provided via:
    /// - CLI: `--github-token <TOKEN>` or `-g <TOKEN>`
    /// - Environment: `TCTEST_GITHUB_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `github_token = "..."`
    ///
    /// Optional: public repositories can be read anonymously within GitHub's
    /// unauthenticated rate limit.
    #[ortho_config(cli_short = 'g')]
    pub github_token: Option<String>,

    /// GitHub API base, for GitHub Enterprise.
    #[ortho_config(cli_short = 'G')]
    pub github_api_url: Option<String>,

    /// Repository as `owner/name` or a repository URL.
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Regular expression selecting changed files that may have tests.
    #[ortho_config(cli_short = 'f')]
    pub file_pattern: Option<String>,

    /// Delimiter at which discovered test names are truncated.
    #[ortho_config(cli_short = 'S')]
    pub split_tests_on: Option<String>,

    /// Comma-separated directory names that contain service directories.
    #[ortho_config(cli_short = 'D')]
    pub service_dirs: Option<String>,

    /// Comma-separated directory names ignored inside a service.
    #[ortho_config(cli_short = 'K')]
    pub skip_dirs: Option<String>,

    /// Comma-separated file name suffixes ignored inside a service.
    #[ortho_config(cli_short = 'X')]
    pub skip_suffixes: Option<String>,

    /// Treat a pull request without candidate files as having no tests
    /// instead of failing.
    #[ortho_config(cli_short = 'A')]
    pub allow_no_matching_files: bool,

    /// Extra build properties as `NAME=value;NAME2=value2`.
    #[ortho_config(cli_short = 'p')]
    pub properties: Option<String>,

    /// Comma-separated tags attached to triggered builds.
    #[ortho_config(cli_short = 'T')]
    pub tags: Option<String>,

    /// Put triggered builds at the top of the queue.
    #[ortho_config(cli_short = 'q')]
    pub skip_queue: bool,

    /// Wait for triggered builds to finish and print their results.
    #[ortho_config(cli_short = 'w')]
    pub wait: bool,

    /// Only consider the most recent build when reading PR results.
    #[ortho_config(cli_short = 'l')]
    pub latest: bool,

    /// Run every acceptance test of each service instead of the discovered
    /// ones.
    #[ortho_config(cli_short = 'a')]
    pub run_all: bool,

    /// Longest time a build may wait in the queue, in minutes.
    #[ortho_config(cli_short = 'Q')]
    pub queue_timeout_minutes: u64,

    /// Longest time a build may run, in minutes.
    #[ortho_config(cli_short = 'R')]
    pub run_timeout_minutes: u64,

    /// Delay between build state queries, in seconds.
    #[ortho_config(cli_short = 'I')]
    pub poll_interval_seconds: u64,

    /// Comma-separated author logins accepted by the open PR filters.
    #[ortho_config(cli_short = 'u')]
    pub authors: Option<String>,

    /// Comma-separated labels a PR must all carry (`-label` negates).
    #[ortho_config(cli_short = 'L')]
    pub labels_all: Option<String>,

    /// Comma-separated labels of which a PR must carry one (`-label`
    /// negates).
    #[ortho_config(cli_short = 'y')]
    pub labels_any: Option<String>,

    /// Required milestone title, or `-title` to exclude it.
    #[ortho_config(cli_short = 'm')]
    pub milestone: Option<String>,

    /// Only PRs created within this many hours.
    #[ortho_config(cli_short = 'c')]
    pub created_within_hours: Option<u64>,

    /// Only PRs updated within this many hours.
    #[ortho_config(cli_short = 'C')]
    pub updated_within_hours: Option<u64>,

    /// Case-insensitive regular expression PR titles must match.
    #[ortho_config(cli_short = 't')]
    pub title_pattern: Option<String>,

    /// Skip draft PRs.
    #[ortho_config(cli_short = 'd')]
    pub exclude_drafts: bool,

    /// Branch to build, together with `test_pattern` or `run_all`.
    ///
    /// Can be provided via:
    /// - CLI: `--branch <NAME>` or `-B <NAME>`
    /// - Environment: `TCTEST_BRANCH`
    /// - Config file: `branch = "..."`
    #[ortho_config(cli_short = 'B')]
    pub branch: Option<String>,

    /// Test name regular expression passed to the build. Overrides discovery
    /// in the pull request modes.
    #[ortho_config(cli_short = 'e')]
    pub test_pattern: Option<String>,

    /// Comma-separated pull request numbers.
    ///
    /// Can be provided via:
    /// - CLI: `--prs <N,...>` or `-n <N,...>`
    /// - Environment: `TCTEST_PRS`
    /// - Config file: `prs = "1234,1240"`
    #[ortho_config(cli_short = 'n')]
    pub prs: Option<String>,

    /// Only print discovered tests or selected PRs; trigger nothing.
    #[ortho_config(cli_short = 'o')]
    pub list_only: bool,

    /// Select open pull requests of `repo` with the filter fields.
    #[ortho_config(cli_short = 'O')]
    pub open_prs: bool,

    /// Build ID whose test results should be printed.
    #[ortho_config(cli_short = 'i')]
    pub results: Option<u64>,

    /// Print the test results of the builds of `prs` instead of triggering.
    #[ortho_config(cli_short = 'x')]
    pub pr_results: bool,
}

const DEFAULT_TIMEOUT_MINUTES: u64 = 60;
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 60;

impl Default for TcTestConfig {
    fn default() -> Self {
        Self {
            server: None,
            build_type_id: None,
            tc_token: None,
            username: None,
            password: None,
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            github_token: None,
            github_api_url: None,
            repo: None,
            file_pattern: None,
            split_tests_on: None,
            service_dirs: None,
            skip_dirs: None,
            skip_suffixes: None,
            allow_no_matching_files: false,
            properties: None,
            tags: None,
            skip_queue: false,
            wait: false,
            latest: false,
            run_all: false,
            queue_timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            run_timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            authors: None,
            labels_all: None,
            labels_any: None,
            milestone: None,
            created_within_hours: None,
            updated_within_hours: None,
            title_pattern: None,
            exclude_drafts: false,
            branch: None,
            test_pattern: None,
            prs: None,
            list_only: false,
            open_prs: false,
            results: None,
            pr_results: false,
        }
    }
}

impl TcTestConfig {
    /// Determines the operation mode based on provided configuration.
    ///
    /// A build ID wins over everything else, then PR results, open PR
    /// selection, PR discovery (`list_only`), PR runs and finally a branch
    /// build. Conflicting selections are reported by
    /// [`TcTestConfig::validate`].
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.results.is_some() {
            OperationMode::BuildResults
        } else if self.pr_results && self.prs.is_some() {
            OperationMode::PullRequestResults
        } else if self.open_prs {
            OperationMode::OpenPullRequests
        } else if self.list_only && self.prs.is_some() {
            OperationMode::Discover
        } else if self.prs.is_some() {
            OperationMode::PullRequests
        } else if self.branch.is_some() {
            OperationMode::Branch
        } else {
            OperationMode::Unspecified
        }
    }

    /// Rejects combinations of fields that select more than one mode or use
    /// a mode modifier without its mode.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] describing the first conflict.
    pub fn validate(&self) -> Result<(), TcTestError> {
        let selected = [
            self.branch.is_some(),
            self.prs.is_some(),
            self.open_prs,
            self.results.is_some(),
        ]
        .into_iter()
        .filter(|flag| *flag)
        .count();

        if selected > 1 {
            return Err(TcTestError::configuration(
                "choose only one of --branch, --prs, --open-prs and --results",
            ));
        }
        if self.pr_results && self.prs.is_none() {
            return Err(TcTestError::configuration(
                "--pr-results needs the pull requests given with --prs",
            ));
        }
        if self.pr_results && self.list_only {
            return Err(TcTestError::configuration(
                "--pr-results cannot be combined with --list-only",
            ));
        }
        if self.list_only && (self.branch.is_some() || self.results.is_some()) {
            return Err(TcTestError::configuration(
                "--list-only applies to --prs and --open-prs only",
            ));
        }
        if self.poll_interval_seconds == 0 {
            return Err(TcTestError::configuration(
                "poll interval must be at least one second",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
