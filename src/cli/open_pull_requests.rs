//! Select open pull requests with filters, then list or run them.

use std::io::{self, Write};

use chrono::Utc;
use tctest::{
    BuildRunner, CancelToken, FilterSet, PullRequestGateway, PullRequestNumber,
    PullRequestRunner, RepositoryLocator, TcTestConfig, TcTestError, TestDiscovery,
};

use super::output::write_pull_request_listing;
use super::pull_requests::run_with_runner;

/// Lists the open pull requests passing the configured filters and, unless
/// `list_only` is set, runs their tests.
///
/// # Errors
///
/// Returns [`TcTestError::Configuration`] if required configuration is
/// missing, [`TcTestError::Intake`] when the pull requests cannot be listed
/// and [`TcTestError::RunsFailed`] when some selected pull requests failed.
pub async fn run(config: &TcTestConfig, cancel: &CancelToken) -> Result<(), TcTestError> {
    let repository = config.repository_locator()?;
    let filters = FilterSet::from_criteria(&config.filter_criteria()?, Utc::now())?;

    let mut stdout = io::stdout().lock();
    if config.list_only {
        let gateway = super::github_gateway(config, &repository)?;
        select_pull_requests(&gateway, &repository, &filters, &mut stdout).await?;
        return Ok(());
    }

    let discovery_options = config.discovery_options()?;
    let run_options = config.run_options()?;
    let orchestrator = super::build_orchestrator(config, cancel)?;
    let gateway = super::github_gateway(config, &repository)?;

    let numbers = select_pull_requests(&gateway, &repository, &filters, &mut stdout).await?;
    let runner = PullRequestRunner::new(
        TestDiscovery::new(&gateway, discovery_options),
        BuildRunner::new(&orchestrator, &run_options),
        &repository,
    );
    run_with_runner(&runner, &numbers, &mut stdout).await
}

/// Lists open pull requests, applies `filters` and writes the selection.
///
/// # Errors
///
/// Returns [`TcTestError::Intake`] when listing fails.
pub async fn select_pull_requests<G, W>(
    gateway: &G,
    repository: &RepositoryLocator,
    filters: &FilterSet,
    writer: &mut W,
) -> Result<Vec<PullRequestNumber>, TcTestError>
where
    G: PullRequestGateway,
    W: Write,
{
    let open = gateway.open_pull_requests(repository).await?;
    let total = open.len();
    let selected = filters.apply(open);
    tracing::debug!(
        total,
        filters = filters.len(),
        selected = selected.len(),
        "filtered open pull requests"
    );

    write_pull_request_listing(writer, &repository.slug(), total, &selected)?;
    selected
        .iter()
        .map(|pull_request| PullRequestNumber::new(pull_request.number).map_err(TcTestError::from))
        .collect()
}
