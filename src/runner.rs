//! Turns discovered tests into builds.
//!
//! Each pull request and each service within it is an independent unit of
//! failure: errors are recorded in the returned reports and the remaining
//! work carries on.

use crate::discovery::{ServiceTestMap, TestDiscovery, alternation_pattern};
use crate::error::TcTestError;
use crate::github::{PullRequestGateway, PullRequestNumber, RepositoryLocator};
use crate::orchestrator::{BuildOrchestrator, BuildResults, Clock};
use crate::teamcity::{BuildProperty, BuildRequest, BuildServer, QueuedBuild};

/// Pattern selecting every acceptance test.
pub const RUN_ALL_PATTERN: &str = "TestAcc";

/// Build parameters shared by every triggered build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Base build configuration; services are appended as `_<SERVICE>`.
    pub build_type_id: String,
    /// Explicit test pattern overriding discovery.
    pub test_pattern: Option<String>,
    /// Run every acceptance test, overriding any other pattern.
    pub run_all: bool,
    /// Extra build parameters.
    pub properties: Vec<BuildProperty>,
    /// Build tags.
    pub tags: Vec<String>,
    /// Queue builds at the top.
    pub queue_at_top: bool,
    /// Wait for each build and fetch its results.
    pub wait: bool,
}

impl RunOptions {
    /// Options for `build_type_id` with everything else defaulted.
    #[must_use]
    pub fn new(build_type_id: impl Into<String>) -> Self {
        Self {
            build_type_id: build_type_id.into(),
            ..Self::default()
        }
    }

    fn override_pattern(&self) -> Option<&str> {
        if self.run_all {
            Some(RUN_ALL_PATTERN)
        } else {
            self.test_pattern.as_deref()
        }
    }
}

/// Build configuration for `service`: the base id for the empty service,
/// otherwise `<base>_<SERVICE>`.
///
/// ```
/// use tctest::runner::service_build_type;
///
/// assert_eq!(service_build_type("PROVIDER", "foo"), "PROVIDER_FOO");
/// assert_eq!(service_build_type("PROVIDER", ""), "PROVIDER");
/// ```
#[must_use]
pub fn service_build_type(base: &str, service: &str) -> String {
    if service.is_empty() {
        base.to_owned()
    } else {
        format!("{base}_{}", service.to_uppercase())
    }
}

/// Qualifies a bare branch name with `refs/heads/`.
///
/// ```
/// use tctest::runner::branch_reference;
///
/// assert_eq!(branch_reference("main"), "refs/heads/main");
/// assert_eq!(branch_reference("refs/pull/1/merge"), "refs/pull/1/merge");
/// ```
#[must_use]
pub fn branch_reference(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_owned()
    } else {
        format!("refs/heads/{branch}")
    }
}

/// One build to trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBuild {
    /// Service the build covers; empty for ungrouped tests.
    pub service: String,
    /// Build configuration id.
    pub build_type_id: String,
    /// Branch reference.
    pub branch: String,
    /// Test selector.
    pub test_pattern: String,
}

/// Plans the builds for pull request `number` from its discovered tests.
///
/// # Errors
///
/// Returns [`TcTestError::NoTestsDiscovered`] when `discovered` is empty and
/// no pattern override is configured.
pub fn plan_builds(
    options: &RunOptions,
    number: PullRequestNumber,
    discovered: &ServiceTestMap,
) -> Result<Vec<PlannedBuild>, TcTestError> {
    let branch = number.merge_ref();
    let override_pattern = options.override_pattern();

    if discovered.is_empty() {
        let pr = number.get();
        let pattern = override_pattern.ok_or(TcTestError::NoTestsDiscovered { number: pr })?;
        return Ok(vec![PlannedBuild {
            service: String::new(),
            build_type_id: options.build_type_id.clone(),
            branch,
            test_pattern: pattern.to_owned(),
        }]);
    }

    Ok(discovered
        .iter()
        .map(|(service, tests)| PlannedBuild {
            service: service.to_owned(),
            build_type_id: service_build_type(&options.build_type_id, service),
            branch: branch.clone(),
            test_pattern: override_pattern
                .map_or_else(|| alternation_pattern(tests), ToOwned::to_owned),
        })
        .collect())
}

/// A queued build and, when waited on, its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredBuild {
    /// Queue acknowledgement.
    pub queued: QueuedBuild,
    /// Results, present when the run waited for completion.
    pub results: Option<BuildResults>,
}

/// Outcome of one planned build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRun {
    /// The plan that was executed.
    pub plan: PlannedBuild,
    /// Trigger (and wait) outcome.
    pub outcome: Result<TriggeredBuild, TcTestError>,
}

impl ServiceRun {
    /// Returns true when the build was queued (and, if waited on, finished).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Outcome for one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRun {
    /// Pull request processed.
    pub number: PullRequestNumber,
    /// Per-service runs, or the error that prevented planning.
    pub outcome: Result<Vec<ServiceRun>, TcTestError>,
}

impl PullRequestRun {
    /// Returns true when planning succeeded and every service run did.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome
            .as_ref()
            .is_ok_and(|runs| runs.iter().all(ServiceRun::is_success))
    }
}

/// Triggers builds and optionally waits for their results.
pub struct BuildRunner<'run, Server, Time>
where
    Server: BuildServer,
    Time: Clock,
{
    orchestrator: &'run BuildOrchestrator<Server, Time>,
    options: &'run RunOptions,
}

impl<'run, Server, Time> BuildRunner<'run, Server, Time>
where
    Server: BuildServer,
    Time: Clock,
{
    /// Creates a runner.
    #[must_use]
    pub const fn new(
        orchestrator: &'run BuildOrchestrator<Server, Time>,
        options: &'run RunOptions,
    ) -> Self {
        Self {
            orchestrator,
            options,
        }
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        self.options
    }

    /// Returns true once the orchestrator's cancellation token has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.orchestrator.is_cancelled()
    }

    /// Triggers `plan`, then waits and collects results when configured to.
    ///
    /// # Errors
    ///
    /// Propagates trigger, polling and result failures.
    pub async fn execute(&self, plan: &PlannedBuild) -> Result<TriggeredBuild, TcTestError> {
        let request = BuildRequest::new(
            plan.build_type_id.as_str(),
            plan.branch.as_str(),
            plan.test_pattern.as_str(),
        )
        .with_properties(self.options.properties.iter().cloned())
        .with_tags(self.options.tags.iter().cloned())
        .with_queue_at_top(self.options.queue_at_top);

        let queued = self.orchestrator.trigger_build(&request).await?;
        let results = if self.options.wait {
            self.orchestrator.poll_until_finished(queued.id).await?;
            Some(self.orchestrator.build_results(queued.id, false).await?)
        } else {
            None
        };
        Ok(TriggeredBuild { queued, results })
    }

    /// Triggers one build on `branch` of the base build configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TcTestError::Configuration`] when neither a test pattern nor
    /// run-all is configured. Build failures are reported in the returned
    /// [`ServiceRun`].
    pub async fn run_branch(&self, branch: &str) -> Result<ServiceRun, TcTestError> {
        let pattern = self.options.override_pattern().ok_or_else(|| {
            TcTestError::configuration("a test pattern or --run-all is required for a branch build")
        })?;
        let plan = PlannedBuild {
            service: String::new(),
            build_type_id: self.options.build_type_id.clone(),
            branch: branch_reference(branch),
            test_pattern: pattern.to_owned(),
        };
        let outcome = self.execute(&plan).await;
        Ok(ServiceRun { plan, outcome })
    }
}

/// Discovers and runs the tests of pull requests.
pub struct PullRequestRunner<'run, Gateway, Server, Time>
where
    Gateway: PullRequestGateway,
    Server: BuildServer,
    Time: Clock,
{
    discovery: TestDiscovery<'run, Gateway>,
    builds: BuildRunner<'run, Server, Time>,
    repository: &'run RepositoryLocator,
}

impl<'run, Gateway, Server, Time> PullRequestRunner<'run, Gateway, Server, Time>
where
    Gateway: PullRequestGateway,
    Server: BuildServer,
    Time: Clock,
{
    /// Creates a runner for pull requests in `repository`.
    #[must_use]
    pub const fn new(
        discovery: TestDiscovery<'run, Gateway>,
        builds: BuildRunner<'run, Server, Time>,
        repository: &'run RepositoryLocator,
    ) -> Self {
        Self {
            discovery,
            builds,
            repository,
        }
    }

    /// Discovers and runs the tests of pull request `number`.
    ///
    /// Once cancellation has fired, GitHub is not contacted and the run is
    /// recorded as [`TcTestError::Interrupted`].
    pub async fn run(&self, number: PullRequestNumber) -> PullRequestRun {
        if self.builds.is_cancelled() {
            return PullRequestRun {
                number,
                outcome: Err(TcTestError::Interrupted {
                    number: number.get(),
                }),
            };
        }
        let outcome = self.run_services(number).await;
        if let Err(error) = &outcome {
            tracing::debug!(pr = number.get(), "pull request skipped: {error}");
        }
        PullRequestRun { number, outcome }
    }

    /// Runs every pull request in order.
    pub async fn run_each(&self, numbers: &[PullRequestNumber]) -> Vec<PullRequestRun> {
        let mut runs = Vec::with_capacity(numbers.len());
        for number in numbers {
            runs.push(self.run(*number).await);
        }
        runs
    }

    async fn run_services(&self, number: PullRequestNumber) -> Result<Vec<ServiceRun>, TcTestError> {
        let discovered = self.discovery.discover(self.repository, number).await?;
        let plans = plan_builds(self.builds.options(), number, &discovered)?;

        let mut runs = Vec::with_capacity(plans.len());
        for plan in plans {
            // Services left after cancellation record `NotQueued` without
            // reaching the server.
            tracing::debug!(
                pr = number.get(),
                service = plan.service.as_str(),
                build_type = plan.build_type_id.as_str(),
                "triggering service build"
            );
            let outcome = self.builds.execute(&plan).await;
            runs.push(ServiceRun { plan, outcome });
        }
        Ok(runs)
    }
}
