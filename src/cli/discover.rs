//! Print the tests a pull request touches without triggering builds.

use std::io::{self, Write};

use tctest::discovery::DiscoveryOptions;
use tctest::{
    PullRequestGateway, PullRequestNumber, RepositoryLocator, TcTestConfig, TcTestError,
    TestDiscovery,
};

use super::output::{write_discovered_tests, write_pull_request_error};

/// Discovers and prints the tests of every configured pull request.
///
/// # Errors
///
/// Returns [`TcTestError::Configuration`] if required configuration is
/// missing and [`TcTestError::RunsFailed`] when discovery failed for some
/// pull requests.
pub async fn run(config: &TcTestConfig) -> Result<(), TcTestError> {
    let repository = config.repository_locator()?;
    let numbers = config.pull_request_numbers()?;
    let options = config.discovery_options()?;
    let gateway = super::github_gateway(config, &repository)?;

    let mut stdout = io::stdout().lock();
    run_with_gateway(&gateway, &repository, options, &numbers, &mut stdout).await
}

/// Discovers tests using the given gateway.
///
/// This function is exposed for testing with fake gateways.
pub async fn run_with_gateway<G, W>(
    gateway: &G,
    repository: &RepositoryLocator,
    options: DiscoveryOptions,
    numbers: &[PullRequestNumber],
    writer: &mut W,
) -> Result<(), TcTestError>
where
    G: PullRequestGateway,
    W: Write,
{
    let discovery = TestDiscovery::new(gateway, options);
    let mut failed = 0;

    for number in numbers {
        match discovery.discover(repository, *number).await {
            Ok(tests) => write_discovered_tests(writer, *number, &tests)?,
            Err(error) => {
                failed += 1;
                write_pull_request_error(writer, *number, &error.into())?;
            }
        }
    }

    super::finish(failed, numbers.len())
}

#[cfg(test)]
mod tests {
    use tctest::{DiscoveryOptions, PullRequestNumber, RepositoryLocator, TcTestError};

    use super::run_with_gateway;
    use crate::cli::test_utils::{FakeGateway, FakePullRequest};

    #[tokio::test]
    async fn prints_tests_and_reports_failed_pull_requests() {
        let gateway = FakeGateway::default()
            .with_pull_request(FakePullRequest::open(
                42,
                &["internal/services/foo/resource_x.go"],
            ))
            .with_file(
                "internal/services/foo/resource_x_test.go",
                "func TestAccFooX_basic(t *testing.T) {}\n",
            );
        let repository =
            RepositoryLocator::from_owner_repo("owner", "repo").expect("locator should build");
        let options = DiscoveryOptions::new("(resource_)", "_").expect("pattern should compile");
        let numbers = [42, 43].map(|n| PullRequestNumber::new(n).expect("number should be valid"));

        let mut buffer = Vec::new();
        let result = run_with_gateway(&gateway, &repository, options, &numbers, &mut buffer).await;

        let output = String::from_utf8(buffer).expect("output should be UTF-8");
        assert!(output.contains("Discovered tests for pr #42:\n  foo:\n    TestAccFooX\n"));
        assert!(output.contains("pr #43:\n  ERROR: "));
        assert_eq!(
            result,
            Err(TcTestError::RunsFailed {
                failed: 1,
                total: 2
            })
        );
    }
}
