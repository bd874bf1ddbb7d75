//! Run a test pattern on a single branch.

use std::io::{self, Write};

use tctest::orchestrator::Clock;
use tctest::{
    BuildOrchestrator, BuildRunner, BuildServer, CancelToken, RunOptions, TcTestConfig,
    TcTestError,
};

use super::output::write_service_run;

/// Triggers one build of the base build configuration on the configured
/// branch.
///
/// # Errors
///
/// Returns [`TcTestError::Configuration`] if required configuration is
/// missing and [`TcTestError::RunsFailed`] when the build failed.
pub async fn run(config: &TcTestConfig, cancel: &CancelToken) -> Result<(), TcTestError> {
    let branch = config
        .branch
        .as_deref()
        .ok_or_else(|| TcTestError::configuration("branch is required (use --branch or -B)"))?;
    let options = config.run_options()?;
    let orchestrator = super::build_orchestrator(config, cancel)?;

    let mut stdout = io::stdout().lock();
    run_with_orchestrator(&orchestrator, &options, branch, &mut stdout).await
}

/// Triggers the branch build through the given orchestrator.
pub async fn run_with_orchestrator<S, T, W>(
    orchestrator: &BuildOrchestrator<S, T>,
    options: &RunOptions,
    branch: &str,
    writer: &mut W,
) -> Result<(), TcTestError>
where
    S: BuildServer,
    T: Clock,
    W: Write,
{
    let run = BuildRunner::new(orchestrator, options)
        .run_branch(branch)
        .await?;
    write_service_run(writer, &run)?;
    super::finish(usize::from(!run.is_success()), 1)
}
