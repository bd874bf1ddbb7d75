//! tctest library crate: discover the acceptance tests touched by a GitHub
//! pull request and run them on TeamCity.
//!
//! Discovery reads a pull request's changed files through Octocrab, maps them
//! to test files, downloads those at the merge commit and groups the test
//! functions they declare by service. The orchestrator then queues one
//! TeamCity build per service, optionally polls it to completion under queue
//! and run budgets, and extracts the PASS/FAIL/SKIP lines from the build log.

pub mod config;
pub mod discovery;
pub mod error;
pub mod github;
pub mod http;
pub mod orchestrator;
pub mod runner;
pub mod teamcity;

pub use config::{OperationMode, TcTestConfig};
pub use discovery::{DiscoveryOptions, ServiceTestMap, TestDiscovery};
pub use error::TcTestError;
pub use github::{
    FilterCriteria, FilterSet, IntakeError, OctocrabGateway, PersonalAccessToken, PullRequest,
    PullRequestGateway, PullRequestNumber, RepositoryLocator,
};
pub use orchestrator::{BuildOrchestrator, BuildResults, CancelToken, PollSettings};
pub use runner::{BuildRunner, PullRequestRun, PullRequestRunner, RunOptions, ServiceRun};
pub use teamcity::{BuildError, BuildId, BuildServer, TeamCityClient};
