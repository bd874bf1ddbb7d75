//! CLI operation mode handlers.
//!
//! This module contains the implementations for different operation modes:
//! - [`branch_build`]: Run a test pattern on one branch
//! - [`build_results`]: Print the results of a build or of a PR's builds
//! - [`discover`]: Print the tests a pull request touches
//! - [`open_pull_requests`]: Select open PRs with filters, then list or run them
//! - [`pull_requests`]: Discover and run the tests of listed PRs
//!
//! Output formatting utilities are in [`output`].

use tctest::{
    BuildOrchestrator, CancelToken, OctocrabGateway, PersonalAccessToken, RepositoryLocator,
    TcTestConfig, TcTestError, TeamCityClient,
};

pub mod branch_build;
pub mod build_results;
pub mod discover;
pub mod open_pull_requests;
pub mod output;
pub mod pull_requests;

#[cfg(test)]
pub mod test_utils;

/// Builds the GitHub gateway, authenticated when a token is configured.
///
/// # Errors
///
/// Returns [`TcTestError::Intake`] when the client cannot be constructed.
pub fn github_gateway(
    config: &TcTestConfig,
    repository: &RepositoryLocator,
) -> Result<OctocrabGateway, TcTestError> {
    let token = config
        .resolve_github_token()
        .map(PersonalAccessToken::new)
        .transpose()?;
    Ok(OctocrabGateway::for_token(token.as_ref(), repository)?)
}

/// Builds an orchestrator talking to the configured TeamCity server.
///
/// # Errors
///
/// Returns [`TcTestError::Configuration`] when the server or credentials are
/// missing and [`TcTestError::Build`] when the client cannot be constructed.
pub fn build_orchestrator(
    config: &TcTestConfig,
    cancel: &CancelToken,
) -> Result<BuildOrchestrator<TeamCityClient>, TcTestError> {
    let server = config.require_server()?;
    let auth = config.auth_method()?;
    let client = TeamCityClient::new(server, auth, config.http_timeout())?;
    Ok(BuildOrchestrator::new(client, config.poll_settings()).with_cancel_token(cancel.clone()))
}

/// Turns a failure count into the handler result.
///
/// # Errors
///
/// Returns [`TcTestError::RunsFailed`] when `failed` is non-zero.
pub const fn finish(failed: usize, total: usize) -> Result<(), TcTestError> {
    if failed == 0 {
        Ok(())
    } else {
        Err(TcTestError::RunsFailed { failed, total })
    }
}
