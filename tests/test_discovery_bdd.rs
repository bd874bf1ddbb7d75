//! Behavioural tests for discovering the tests touched by a pull request.

#[path = "support/runtime.rs"]
mod runtime;

use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::json;
use tctest::{
    DiscoveryOptions, IntakeError, OctocrabGateway, PullRequestNumber, RepositoryLocator,
    ServiceTestMap, TestDiscovery,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use runtime::{SharedRuntime, runtime_with_server, server_uri};

#[derive(ScenarioState, Default)]
struct DiscoveryState {
    runtime: Slot<SharedRuntime>,
    server: Slot<MockServer>,
    changed: Slot<Vec<String>>,
    discovered: Slot<ServiceTestMap>,
    error: Slot<IntakeError>,
}

#[fixture]
fn discovery_state() -> DiscoveryState {
    DiscoveryState::default()
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

fn pull_request_path(pr: u64) -> String {
    format!("/api/v3/repos/owner/repo/pulls/{pr}")
}

fn mount(state: &DiscoveryState, mock: Mock) {
    let shared = runtime_with_server(&state.runtime, &state.server)
        .expect("runtime and server should start");
    state
        .server
        .with_ref(|server| shared.block_on(mock.mount(server)))
        .expect("mock server should be running");
}

fn serve_pull_request(state: &DiscoveryState, pr: u64, pr_state: &str) {
    mount(
        state,
        Mock::given(method("GET"))
            .and(path(pull_request_path(pr)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": pr,
                "state": pr_state,
                "title": format!("Change {pr}"),
                "user": { "login": "octocat" },
                "merge_commit_sha": format!("merge-{pr}"),
            }))),
    );
}

#[given("GitHub serves open pull request {pr:u64}")]
fn open_pull_request(discovery_state: &DiscoveryState, pr: u64) {
    serve_pull_request(discovery_state, pr, "open");
}

#[given("GitHub serves closed pull request {pr:u64}")]
fn closed_pull_request(discovery_state: &DiscoveryState, pr: u64) {
    serve_pull_request(discovery_state, pr, "closed");
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("pull request {pr:u64} changes {file}")]
fn pull_request_changes(discovery_state: &DiscoveryState, pr: u64, file: String) {
    let _ = pr;
    let mut changed = discovery_state.changed.take().unwrap_or_default();
    changed.push(unquote(&file).to_owned());
    discovery_state.changed.set(changed);
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("the merge commit of pull request {pr:u64} has {file} declaring {test}")]
fn merge_commit_declares(discovery_state: &DiscoveryState, pr: u64, file: String, test: String) {
    let body = format!(
        "package service\n\nfunc {}(t *testing.T) {{\n}}\n",
        unquote(&test)
    );
    mount(
        discovery_state,
        Mock::given(method("GET"))
            .and(path(format!(
                "/api/v3/repos/owner/repo/contents/{}",
                unquote(&file)
            )))
            .and(query_param("ref", format!("merge-{pr}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body)),
    );
}

#[when("the tests of pull request {pr:u64} are discovered")]
fn discover_tests(discovery_state: &DiscoveryState, pr: u64) {
    let files = discovery_state
        .changed
        .take()
        .unwrap_or_default()
        .into_iter()
        .map(|filename| json!({ "filename": filename }))
        .collect::<Vec<_>>();
    mount(
        discovery_state,
        Mock::given(method("GET"))
            .and(path(format!("{}/files", pull_request_path(pr))))
            .respond_with(ResponseTemplate::new(200).set_body_json(files)),
    );

    let shared = runtime_with_server(&discovery_state.runtime, &discovery_state.server)
        .expect("runtime and server should start");
    let uri = server_uri(&discovery_state.server).expect("server should be running");
    let repository =
        RepositoryLocator::parse(&format!("{uri}/owner/repo")).expect("locator should parse");
    let gateway = shared
        .enter(|| OctocrabGateway::for_token(None, &repository))
        .expect("gateway should build");
    let options = DiscoveryOptions::new("(resource_)", "_").expect("options should build");
    let number = PullRequestNumber::new(pr).expect("number should be valid");

    let discovery = TestDiscovery::new(&gateway, options);
    match shared.block_on(discovery.discover(&repository, number)) {
        Ok(discovered) => discovery_state.discovered.set(discovered),
        Err(error) => discovery_state.error.set(error),
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("service {service} runs {test}")]
fn service_runs(discovery_state: &DiscoveryState, service: String, test: String) {
    let tests = discovery_state
        .discovered
        .with_ref(|discovered| discovered.tests_for(unquote(&service)).cloned())
        .expect("discovery should have succeeded")
        .expect("service should have tests");

    assert!(
        tests.contains(unquote(&test)),
        "expected {test} in {tests:?}"
    );
}

#[then("{count:u64} service has tests")]
fn service_count(discovery_state: &DiscoveryState, count: u64) {
    let services = discovery_state
        .discovered
        .with_ref(ServiceTestMap::service_count)
        .expect("discovery should have succeeded");

    assert_eq!(u64::try_from(services).expect("count should fit"), count);
}

#[then("discovery fails because pull request {pr:u64} is closed")]
fn fails_closed(discovery_state: &DiscoveryState, pr: u64) {
    let error = discovery_state
        .error
        .take()
        .expect("discovery should have failed");

    assert_eq!(error, IntakeError::ClosedPullRequest { number: pr });
}

#[then("discovery fails because no files matched")]
fn fails_without_candidates(discovery_state: &DiscoveryState) {
    let error = discovery_state
        .error
        .take()
        .expect("discovery should have failed");

    assert!(
        matches!(error, IntakeError::NoMatchingFiles { .. }),
        "unexpected error: {error}"
    );
}

#[scenario(path = "tests/features/test_discovery.feature", index = 0)]
fn tests_grouped_by_service(discovery_state: DiscoveryState) {
    let _ = discovery_state;
}

#[scenario(path = "tests/features/test_discovery.feature", index = 1)]
fn closed_pull_request_refused(discovery_state: DiscoveryState) {
    let _ = discovery_state;
}

#[scenario(path = "tests/features/test_discovery.feature", index = 2)]
fn changes_without_tests_fail(discovery_state: DiscoveryState) {
    let _ = discovery_state;
}
