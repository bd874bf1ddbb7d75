//! Discover the tests of pull requests and run them.

use std::io::{self, Write};

use tctest::orchestrator::Clock;
use tctest::{
    BuildRunner, BuildServer, CancelToken, PullRequestGateway, PullRequestNumber, PullRequestRunner,
    TcTestConfig, TcTestError, TestDiscovery,
};

use super::output::{io_error, write_pull_request_run};

/// Runs the tests of every configured pull request.
///
/// All configuration is resolved before GitHub or TeamCity is contacted.
///
/// # Errors
///
/// Returns [`TcTestError::Configuration`] if required configuration is
/// missing and [`TcTestError::RunsFailed`] when some pull requests or
/// services failed.
pub async fn run(config: &TcTestConfig, cancel: &CancelToken) -> Result<(), TcTestError> {
    let repository = config.repository_locator()?;
    let numbers = config.pull_request_numbers()?;
    let discovery_options = config.discovery_options()?;
    let run_options = config.run_options()?;
    let orchestrator = super::build_orchestrator(config, cancel)?;
    let gateway = super::github_gateway(config, &repository)?;

    let runner = PullRequestRunner::new(
        TestDiscovery::new(&gateway, discovery_options),
        BuildRunner::new(&orchestrator, &run_options),
        &repository,
    );
    let mut stdout = io::stdout().lock();
    run_with_runner(&runner, &numbers, &mut stdout).await
}

/// Runs pull requests with a prepared runner, writing each outcome as soon as
/// it is known.
pub async fn run_with_runner<G, S, T, W>(
    runner: &PullRequestRunner<'_, G, S, T>,
    numbers: &[PullRequestNumber],
    writer: &mut W,
) -> Result<(), TcTestError>
where
    G: PullRequestGateway,
    S: BuildServer,
    T: Clock,
    W: Write,
{
    writeln!(writer, "testing {} prs", numbers.len()).map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;

    let mut failed = 0;
    for number in numbers {
        let run = runner.run(*number).await;
        if !run.is_success() {
            failed += 1;
        }
        write_pull_request_run(writer, &run)?;
    }

    super::finish(failed, numbers.len())
}
