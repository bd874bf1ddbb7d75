//! Acceptance test discovery from a pull request's changed files.
//!
//! Discovery walks every page of changed files, drops generated code, maps
//! the remaining source files to their test files, downloads those at the
//! pull request's merge commit and collects test names grouped by service.
//! Individual download failures are logged and skipped; everything else is
//! reported as an [`IntakeError`].

mod candidates;
mod extract;
mod layout;
mod service_map;


pub use candidates::{SkipRules, select_candidates, test_file_for};
pub use extract::{test_declarations, truncate_test_name};
pub use layout::SourceLayout;
pub use service_map::{ServiceTestMap, alternation_pattern};

use regex::Regex;

use crate::github::error::IntakeError;
use crate::github::gateway::PullRequestGateway;
use crate::github::locator::{PullRequestNumber, RepositoryLocator};
use crate::github::models::ChangedFile;

/// File pattern matching Terraform provider resources and data sources.
pub const DEFAULT_FILE_PATTERN: &str = "(^[a-z]*/resource_|^[a-z]*/data_source_)";

/// Delimiter separating a test's group name from its variant suffix.
pub const DEFAULT_SPLIT_DELIMITER: &str = "_";

/// Largest page size GitHub accepts for pull request files.
const CHANGED_FILES_PER_PAGE: u8 = 100;

/// What to do when no changed file maps to a test file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyCandidatePolicy {
    /// Report [`IntakeError::NoMatchingFiles`].
    #[default]
    Fail,
    /// Return an empty [`ServiceTestMap`].
    ReturnEmpty,
}

/// Parameters controlling test discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Pattern a changed source path must match to be considered.
    pub file_pattern: Regex,
    /// Delimiter at which test names are truncated.
    pub split_delimiter: String,
    /// Repository naming conventions.
    pub layout: SourceLayout,
    /// Paths dropped before classification.
    pub skip_rules: SkipRules,
    /// Behaviour when nothing survives classification.
    pub empty_policy: EmptyCandidatePolicy,
}

impl DiscoveryOptions {
    /// Compiles `file_pattern` and uses default layout, skip rules and policy.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn new(file_pattern: &str, split_delimiter: &str) -> Result<Self, IntakeError> {
        let compiled = Regex::new(file_pattern).map_err(|error| IntakeError::InvalidPattern {
            pattern: file_pattern.to_owned(),
            message: error.to_string(),
        })?;
        Ok(Self {
            file_pattern: compiled,
            split_delimiter: split_delimiter.to_owned(),
            layout: SourceLayout::default(),
            skip_rules: SkipRules::default(),
            empty_policy: EmptyCandidatePolicy::default(),
        })
    }

    /// Replaces the repository layout.
    #[must_use]
    pub fn with_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replaces the skip rules.
    #[must_use]
    pub fn with_skip_rules(mut self, skip_rules: SkipRules) -> Self {
        self.skip_rules = skip_rules;
        self
    }

    /// Replaces the empty-candidate policy.
    #[must_use]
    pub const fn with_empty_policy(mut self, empty_policy: EmptyCandidatePolicy) -> Self {
        self.empty_policy = empty_policy;
        self
    }
}

/// Discovers acceptance tests touched by a pull request using a gateway.
pub struct TestDiscovery<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    client: &'client Gateway,
    options: DiscoveryOptions,
}

impl<'client, Gateway> TestDiscovery<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Create a discovery engine using the provided gateway.
    #[must_use]
    pub const fn new(client: &'client Gateway, options: DiscoveryOptions) -> Self {
        Self { client, options }
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Discover the tests affected by pull request `number`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::ClosedPullRequest`] for closed pull requests
    /// before listing any files, [`IntakeError::NoMatchingFiles`] when nothing
    /// maps to a test file under [`EmptyCandidatePolicy::Fail`], and
    /// [`IntakeError::MissingMergeCommit`] when GitHub has no merge commit to
    /// read tests from. Gateway failures other than per-file downloads are
    /// propagated.
    pub async fn discover(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<ServiceTestMap, IntakeError> {
        let pull_request = self.client.pull_request(repository, number).await?;
        if pull_request.is_closed() {
            return Err(IntakeError::ClosedPullRequest {
                number: number.get(),
            });
        }

        let changed = self.changed_files(repository, number).await?;
        let candidates = select_candidates(
            changed.iter().map(|file| file.path.as_str()),
            &self.options.file_pattern,
            &self.options.skip_rules,
            &self.options.layout,
        );
        tracing::debug!(
            pr = number.get(),
            changed = changed.len(),
            candidates = candidates.len(),
            "classified changed files"
        );

        if candidates.is_empty() {
            return match self.options.empty_policy {
                EmptyCandidatePolicy::Fail => Err(IntakeError::NoMatchingFiles {
                    pattern: self.options.file_pattern.as_str().to_owned(),
                }),
                EmptyCandidatePolicy::ReturnEmpty => Ok(ServiceTestMap::new()),
            };
        }

        let pr = number.get();
        let merge_commit = pull_request
            .merge_commit_sha
            .as_deref()
            .ok_or(IntakeError::MissingMergeCommit { number: pr })?;

        let mut discovered = ServiceTestMap::new();
        for path in &candidates {
            match self
                .client
                .file_content(repository, path, merge_commit)
                .await
            {
                Ok(content) => self.collect_tests(path, &content, &mut discovered),
                Err(error) => {
                    tracing::warn!(path = path.as_str(), "skipping test file: {error}");
                }
            }
        }

        tracing::debug!(
            pr,
            services = discovered.service_count(),
            tests = discovered.len(),
            "discovered tests"
        );
        Ok(discovered)
    }

    /// List every changed file, following pagination until GitHub reports
    /// no further page.
    ///
    /// # Errors
    ///
    /// Propagates any gateway failure.
    pub async fn changed_files(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<Vec<ChangedFile>, IntakeError> {
        let mut files = Vec::new();
        let mut next = Some(1_u32);

        while let Some(page) = next {
            let result = self
                .client
                .changed_files(repository, number, page, CHANGED_FILES_PER_PAGE)
                .await?;
            tracing::trace!(
                pr = number.get(),
                page = result.page_info.page(),
                per_page = result.page_info.per_page(),
                last_page = ?result.page_info.last_page(),
                files = result.files.len(),
                "listed changed files page"
            );
            files.extend(result.files);
            next = result.page_info.next_page();
        }

        Ok(files)
    }

    fn collect_tests(&self, path: &str, content: &str, discovered: &mut ServiceTestMap) {
        let service = self.options.layout.service_for(path);
        for declaration in test_declarations(content, &self.options.layout) {
            let name = truncate_test_name(declaration, &self.options.split_delimiter);
            discovered.insert(service, name);
        }
    }
}
