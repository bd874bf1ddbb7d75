//! Build submission, polling and result retrieval.
//!
//! [`BuildOrchestrator`] drives a [`BuildServer`] through the
//! `queued -> running -> finished` lifecycle. Waiting is bounded by two
//! independent budgets in [`PollSettings`], sleeps go through a [`Clock`] and
//! every wait can be interrupted with a [`CancelToken`].

mod poller;
mod results;


pub use poller::{CancelToken, Clock, PollSettings, TokioClock};
pub use results::{BuildReport, BuildResults, Completeness, result_lines};

use crate::github::PullRequestNumber;
use crate::teamcity::{
    Build, BuildError, BuildId, BuildRequest, BuildServer, BuildState, PollPhase, QueuedBuild,
};

/// Submits builds and waits on them.
pub struct BuildOrchestrator<Server, Time = TokioClock>
where
    Server: BuildServer,
    Time: Clock,
{
    server: Server,
    clock: Time,
    settings: PollSettings,
    cancel: CancelToken,
}

impl<Server> BuildOrchestrator<Server, TokioClock>
where
    Server: BuildServer,
{
    /// Creates an orchestrator sleeping on the Tokio timer.
    #[must_use]
    pub fn new(server: Server, settings: PollSettings) -> Self {
        Self::with_clock(server, TokioClock, settings)
    }
}

impl<Server, Time> BuildOrchestrator<Server, Time>
where
    Server: BuildServer,
    Time: Clock,
{
    /// Creates an orchestrator with an explicit clock.
    #[must_use]
    pub fn with_clock(server: Server, clock: Time, settings: PollSettings) -> Self {
        Self {
            server,
            clock,
            settings,
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Polling budgets in effect.
    #[must_use]
    pub const fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Returns true once the cancellation token has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Queue a build.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NotQueued`] without contacting the server once
    /// the token has fired, and propagates [`BuildServer::trigger_build`]
    /// failures.
    pub async fn trigger_build(&self, request: &BuildRequest) -> Result<QueuedBuild, BuildError> {
        if self.is_cancelled() {
            return Err(BuildError::NotQueued {
                build_type_id: request.build_type_id.clone(),
            });
        }
        let queued = self.server.trigger_build(request).await?;
        tracing::debug!(
            build = queued.id.get(),
            build_type = request.build_type_id.as_str(),
            "build queued"
        );
        Ok(queued)
    }

    /// Block until the build reports `finished`.
    ///
    /// Each iteration checks cancellation, then the run budget, then the
    /// queue budget, and only then queries the server.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Cancelled`] when the token fires,
    /// [`BuildError::Timeout`] once a phase has accumulated more than its
    /// budget, and [`BuildError::BuildNotFound`] when the build disappears.
    pub async fn poll_until_finished(&self, build_id: BuildId) -> Result<(), BuildError> {
        let interval = self.settings.interval;
        let mut queued = std::time::Duration::ZERO;
        let mut running = std::time::Duration::ZERO;

        loop {
            if self.cancel.is_cancelled() {
                return Err(BuildError::Cancelled { build_id });
            }
            if running > self.settings.run_timeout {
                return Err(BuildError::Timeout {
                    build_id,
                    phase: PollPhase::Running,
                    elapsed: running,
                });
            }
            if queued > self.settings.queue_timeout {
                return Err(BuildError::Timeout {
                    build_id,
                    phase: PollPhase::Queued,
                    elapsed: queued,
                });
            }

            let state = self.server.build_state(build_id).await?;
            tracing::debug!(build = build_id.get(), state = state.as_str(), "polled build");
            match state {
                BuildState::Queued => queued = queued.saturating_add(interval),
                BuildState::Running => running = running.saturating_add(interval),
                BuildState::Finished => return Ok(()),
            }

            tokio::select! {
                () = self.clock.sleep(interval) => {}
                () = self.cancel.cancelled() => {
                    return Err(BuildError::Cancelled { build_id });
                }
            }
        }
    }

    /// Fetch the build log and keep the PASS/FAIL/SKIP lines.
    ///
    /// # Errors
    ///
    /// A missing log is [`BuildError::BuildStillQueued`] when the build is
    /// still in the queue and [`BuildError::BuildNotFound`] otherwise.
    pub async fn fetch_result_lines(&self, build_id: BuildId) -> Result<Vec<String>, BuildError> {
        match self.server.build_log(build_id).await {
            Ok(log) => Ok(result_lines(&log)),
            Err(BuildError::BuildNotFound { .. }) => {
                if self.server.is_queued(build_id).await? {
                    Err(BuildError::BuildStillQueued { build_id })
                } else {
                    Err(BuildError::BuildNotFound { build_id })
                }
            }
            Err(other) => Err(other),
        }
    }

    /// Results of one build, optionally waiting for it to finish first.
    ///
    /// # Errors
    ///
    /// Propagates state, polling and log failures.
    pub async fn build_results(
        &self,
        build_id: BuildId,
        wait: bool,
    ) -> Result<BuildResults, BuildError> {
        let state = self.server.build_state(build_id).await?;
        self.results_from_state(build_id, state, wait).await
    }

    /// Builds of `build_type_id` for pull request `number`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoBuildsForPullRequest`] when none exist.
    pub async fn builds_for_pull_request(
        &self,
        build_type_id: &str,
        number: PullRequestNumber,
        latest: bool,
    ) -> Result<Vec<Build>, BuildError> {
        self.server
            .builds_for_pull_request(build_type_id, number, latest)
            .await
    }

    /// Results of every build for pull request `number`. A failure for one
    /// build is reported in its [`BuildReport`] and does not stop the rest.
    ///
    /// # Errors
    ///
    /// Returns an error only when the builds cannot be listed.
    pub async fn pull_request_results(
        &self,
        build_type_id: &str,
        number: PullRequestNumber,
        latest: bool,
        wait: bool,
    ) -> Result<Vec<BuildReport>, BuildError> {
        let builds = self
            .builds_for_pull_request(build_type_id, number, latest)
            .await?;

        let mut reports = Vec::with_capacity(builds.len());
        for build in builds {
            let outcome = self.results_from_state(build.id, build.state, wait).await;
            reports.push(BuildReport { build, outcome });
        }
        Ok(reports)
    }

    async fn results_from_state(
        &self,
        build_id: BuildId,
        state: BuildState,
        wait: bool,
    ) -> Result<BuildResults, BuildError> {
        if state != BuildState::Finished && wait {
            self.poll_until_finished(build_id).await?;
        }

        let lines = self.fetch_result_lines(build_id).await?;
        let completeness = if state == BuildState::Running && !wait {
            Completeness::Incomplete { state }
        } else {
            Completeness::Complete
        };
        Ok(BuildResults {
            build_id,
            lines,
            completeness,
        })
    }
}
