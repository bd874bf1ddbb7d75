//! Conversions from [`TcTestConfig`] into the parameters the library takes.

use std::env;
use std::time::Duration;

use super::TcTestConfig;
use crate::discovery::{
    DEFAULT_FILE_PATTERN, DEFAULT_SPLIT_DELIMITER, DiscoveryOptions, EmptyCandidatePolicy,
    SkipRules, SourceLayout,
};
use crate::error::TcTestError;
use crate::github::{FilterCriteria, PullRequestNumber, RepositoryLocator};
use crate::http::AuthMethod;
use crate::orchestrator::PollSettings;
use crate::runner::RunOptions;
use crate::teamcity::{BuildId, BuildProperty};

const SECONDS_PER_MINUTE: u64 = 60;

/// Splits a comma-separated list, dropping blank entries.
fn comma_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

const fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(SECONDS_PER_MINUTE))
}

fn hours(value: u64, field: &str) -> Result<chrono::Duration, TcTestError> {
    i64::try_from(value)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .ok_or_else(|| TcTestError::configuration(format!("{field} is too large: {value}")))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

impl TcTestConfig {
    /// Resolves the GitHub token from configuration or the legacy
    /// `GITHUB_TOKEN` environment variable. Blank values count as absent.
    #[must_use]
    pub fn resolve_github_token(&self) -> Option<String> {
        non_blank(self.github_token.as_deref())
            .map(ToOwned::to_owned)
            .or_else(|| {
                env::var("GITHUB_TOKEN")
                    .ok()
                    .filter(|token| !token.trim().is_empty())
            })
    }

    /// Returns the TeamCity server or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when no server is configured.
    pub fn require_server(&self) -> Result<&str, TcTestError> {
        non_blank(self.server.as_deref()).ok_or_else(|| {
            TcTestError::configuration("TeamCity server is required (use --server or -s)")
        })
    }

    /// Returns the base build configuration ID or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when no build type is
    /// configured.
    pub fn require_build_type_id(&self) -> Result<&str, TcTestError> {
        non_blank(self.build_type_id.as_deref()).ok_or_else(|| {
            TcTestError::configuration("build type ID is required (use --build-type-id or -b)")
        })
    }

    /// Credentials for TeamCity. A token wins over username and password.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when neither a token nor a
    /// username is configured.
    pub fn auth_method(&self) -> Result<AuthMethod, TcTestError> {
        if let Some(token) = non_blank(self.tc_token.as_deref()) {
            return Ok(AuthMethod::Token(token.to_owned()));
        }
        let username = non_blank(self.username.as_deref()).ok_or_else(|| {
            TcTestError::configuration(
                "TeamCity credentials are required (use --tc-token, or --username and --password)",
            )
        })?;
        Ok(AuthMethod::Basic {
            username: username.to_owned(),
            password: self.password.clone().unwrap_or_default(),
        })
    }

    /// Timeout applied to each TeamCity request.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Polling budgets and cadence.
    #[must_use]
    pub const fn poll_settings(&self) -> PollSettings {
        PollSettings {
            queue_timeout: minutes(self.queue_timeout_minutes),
            run_timeout: minutes(self.run_timeout_minutes),
            interval: Duration::from_secs(self.poll_interval_seconds),
        }
    }

    /// Repository to read pull requests from, honouring `github_api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when no repository is
    /// configured and [`TcTestError::Intake`] when it cannot be parsed.
    pub fn repository_locator(&self) -> Result<RepositoryLocator, TcTestError> {
        let repo = non_blank(self.repo.as_deref()).ok_or_else(|| {
            TcTestError::configuration("repository is required (use --repo or -r)")
        })?;
        let locator = RepositoryLocator::parse(repo)?;
        match non_blank(self.github_api_url.as_deref()) {
            Some(api_base) => Ok(locator.with_api_base(api_base)?),
            None => Ok(locator),
        }
    }

    /// Pull request numbers listed in `prs`.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when the list is missing or
    /// empty and [`TcTestError::Intake`] when an entry is not a number.
    pub fn pull_request_numbers(&self) -> Result<Vec<PullRequestNumber>, TcTestError> {
        let entries = comma_list(self.prs.as_deref());
        if entries.is_empty() {
            return Err(TcTestError::configuration(
                "pull request numbers are required (use --prs or -n)",
            ));
        }
        entries
            .iter()
            .map(|entry| PullRequestNumber::parse(entry).map_err(TcTestError::from))
            .collect()
    }

    /// Build ID given with `results`.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when no build ID is configured.
    pub fn require_build_id(&self) -> Result<BuildId, TcTestError> {
        self.results.map(BuildId::new).ok_or_else(|| {
            TcTestError::configuration("build ID is required (use --results or -i)")
        })
    }

    /// Discovery settings with the repository layout overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Intake`] when the file pattern does not compile.
    pub fn discovery_options(&self) -> Result<DiscoveryOptions, TcTestError> {
        let file_pattern = self.file_pattern.as_deref().unwrap_or(DEFAULT_FILE_PATTERN);
        let delimiter = self
            .split_tests_on
            .as_deref()
            .unwrap_or(DEFAULT_SPLIT_DELIMITER);

        let mut layout = SourceLayout::default();
        let service_dirs = comma_list(self.service_dirs.as_deref());
        if !service_dirs.is_empty() {
            layout.service_directories = service_dirs;
        }

        let mut skip_rules = SkipRules::default();
        if self.skip_dirs.is_some() {
            skip_rules.directories = comma_list(self.skip_dirs.as_deref());
        }
        if self.skip_suffixes.is_some() {
            skip_rules.file_suffixes = comma_list(self.skip_suffixes.as_deref());
        }

        let policy = if self.allow_no_matching_files {
            EmptyCandidatePolicy::ReturnEmpty
        } else {
            EmptyCandidatePolicy::Fail
        };

        Ok(DiscoveryOptions::new(file_pattern, delimiter)?
            .with_layout(layout)
            .with_skip_rules(skip_rules)
            .with_empty_policy(policy))
    }

    /// Filter criteria for open pull request selection.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when an hour window does not
    /// fit a time span.
    pub fn filter_criteria(&self) -> Result<FilterCriteria, TcTestError> {
        Ok(FilterCriteria {
            authors: comma_list(self.authors.as_deref()),
            labels_all: comma_list(self.labels_all.as_deref()),
            labels_any: comma_list(self.labels_any.as_deref()),
            milestone: non_blank(self.milestone.as_deref()).map(ToOwned::to_owned),
            created_within: self
                .created_within_hours
                .map(|value| hours(value, "created_within_hours"))
                .transpose()?,
            updated_within: self
                .updated_within_hours
                .map(|value| hours(value, "updated_within_hours"))
                .transpose()?,
            title_pattern: non_blank(self.title_pattern.as_deref()).map(ToOwned::to_owned),
            exclude_drafts: self.exclude_drafts,
        })
    }

    /// Build submission settings.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when no build type is
    /// configured and [`TcTestError::Build`] when `properties` is malformed.
    pub fn run_options(&self) -> Result<RunOptions, TcTestError> {
        let properties = BuildProperty::parse_list(self.properties.as_deref().unwrap_or_default())?;
        Ok(RunOptions {
            build_type_id: self.require_build_type_id()?.to_owned(),
            test_pattern: non_blank(self.test_pattern.as_deref()).map(ToOwned::to_owned),
            run_all: self.run_all,
            properties,
            tags: comma_list(self.tags.as_deref()),
            queue_at_top: self.skip_queue,
            wait: self.wait,
        })
    }
}
