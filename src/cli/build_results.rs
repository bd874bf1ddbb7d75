//! Print the test results of a build or of a pull request's builds.

use std::io::{self, Write};

use tctest::orchestrator::Clock;
use tctest::{
    BuildId, BuildOrchestrator, BuildServer, CancelToken, PullRequestNumber, TcTestConfig,
    TcTestError,
};

use super::output::{io_error, write_build_report, write_build_results, write_pull_request_error};

/// Prints the results of the configured build ID.
///
/// # Errors
///
/// Returns [`TcTestError::Configuration`] if required configuration is
/// missing and [`TcTestError::Build`] when the results cannot be read.
pub async fn run(config: &TcTestConfig, cancel: &CancelToken) -> Result<(), TcTestError> {
    let build_id = config.require_build_id()?;
    let orchestrator = super::build_orchestrator(config, cancel)?;

    let mut stdout = io::stdout().lock();
    run_for_build(&orchestrator, build_id, config.wait, &mut stdout).await
}

/// Prints the results of `build_id`, waiting for it first when `wait` is set.
pub async fn run_for_build<S, T, W>(
    orchestrator: &BuildOrchestrator<S, T>,
    build_id: BuildId,
    wait: bool,
    writer: &mut W,
) -> Result<(), TcTestError>
where
    S: BuildServer,
    T: Clock,
    W: Write,
{
    if wait {
        writeln!(writer, "Waiting for build {build_id} status to be 'finished'...")
            .map_err(|e| io_error(&e))?;
    }
    let results = orchestrator.build_results(build_id, wait).await?;
    write_build_results(writer, &results)
}

/// Prints the results of every build of the configured pull requests.
///
/// # Errors
///
/// Returns [`TcTestError::Configuration`] if required configuration is
/// missing and [`TcTestError::RunsFailed`] when some builds could not be
/// listed or read.
pub async fn run_pull_requests(
    config: &TcTestConfig,
    cancel: &CancelToken,
) -> Result<(), TcTestError> {
    let numbers = config.pull_request_numbers()?;
    let build_type_id = config.require_build_type_id()?;
    let orchestrator = super::build_orchestrator(config, cancel)?;
    let selection = ResultSelection {
        build_type_id,
        latest: config.latest,
        wait: config.wait,
    };

    let mut stdout = io::stdout().lock();
    run_for_pull_requests(&orchestrator, &selection, &numbers, &mut stdout).await
}

/// Which builds of a pull request to report.
pub struct ResultSelection<'a> {
    /// Build configuration the builds belong to.
    pub build_type_id: &'a str,
    /// Only the most recent build.
    pub latest: bool,
    /// Wait for unfinished builds.
    pub wait: bool,
}

/// Prints the build results of each pull request in `numbers`.
pub async fn run_for_pull_requests<S, T, W>(
    orchestrator: &BuildOrchestrator<S, T>,
    selection: &ResultSelection<'_>,
    numbers: &[PullRequestNumber],
    writer: &mut W,
) -> Result<(), TcTestError>
where
    S: BuildServer,
    T: Clock,
    W: Write,
{
    let mut failed = 0;
    let mut total = 0;

    for number in numbers {
        let listed = orchestrator
            .pull_request_results(
                selection.build_type_id,
                *number,
                selection.latest,
                selection.wait,
            )
            .await;
        match listed {
            Ok(reports) => {
                for report in &reports {
                    total += 1;
                    if report.outcome.is_err() {
                        failed += 1;
                    }
                    write_build_report(writer, *number, report)?;
                }
            }
            Err(error) => {
                total += 1;
                failed += 1;
                write_pull_request_error(writer, *number, &error.into())?;
            }
        }
    }

    super::finish(failed, total)
}
