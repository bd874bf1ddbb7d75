//! Tests for field resolution and conversion into library parameters.

use std::time::Duration;

use rstest::rstest;

use crate::TcTestConfig;
use crate::discovery::EmptyCandidatePolicy;
use crate::error::TcTestError;
use crate::github::{IntakeError, PullRequestNumber};
use crate::http::AuthMethod;
use crate::teamcity::{BuildError, BuildId, BuildProperty};

#[rstest]
fn resolve_github_token_returns_value_when_present() {
    let config = TcTestConfig {
        github_token: Some("my-token".to_owned()),
        ..Default::default()
    };

    assert_eq!(config.resolve_github_token(), Some("my-token".to_owned()));
}

#[rstest]
fn resolve_github_token_falls_back_to_legacy_variable() {
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("legacy-token"))]);
    let config = TcTestConfig::default();

    assert_eq!(
        config.resolve_github_token(),
        Some("legacy-token".to_owned())
    );
}

#[rstest]
fn resolve_github_token_is_optional() {
    // Lock and clear GITHUB_TOKEN to ensure test isolation
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);
    let config = TcTestConfig {
        github_token: Some("   ".to_owned()),
        ..Default::default()
    };

    assert_eq!(config.resolve_github_token(), None);
}

#[rstest]
fn token_wins_over_basic_credentials() {
    let config = TcTestConfig {
        tc_token: Some("tc-token".to_owned()),
        username: Some("user".to_owned()),
        password: Some("pass".to_owned()),
        ..Default::default()
    };

    assert_eq!(
        config.auth_method(),
        Ok(AuthMethod::Token("tc-token".to_owned()))
    );
}

#[rstest]
fn basic_credentials_are_used_without_token() {
    let config = TcTestConfig {
        username: Some("user".to_owned()),
        password: Some("pass".to_owned()),
        ..Default::default()
    };

    assert_eq!(
        config.auth_method(),
        Ok(AuthMethod::Basic {
            username: "user".to_owned(),
            password: "pass".to_owned(),
        })
    );
}

#[rstest]
fn missing_credentials_are_a_configuration_error() {
    let result = TcTestConfig::default().auth_method();

    assert!(matches!(result, Err(TcTestError::Configuration { .. })));
}

#[rstest]
fn required_build_parameters_are_reported() {
    let config = TcTestConfig::default();

    assert!(matches!(
        config.require_server(),
        Err(TcTestError::Configuration { .. })
    ));
    assert!(matches!(
        config.require_build_type_id(),
        Err(TcTestError::Configuration { .. })
    ));
    assert!(matches!(
        config.require_build_id(),
        Err(TcTestError::Configuration { .. })
    ));
}

#[rstest]
fn poll_settings_convert_minutes_and_seconds() {
    let config = TcTestConfig {
        queue_timeout_minutes: 2,
        run_timeout_minutes: 90,
        poll_interval_seconds: 15,
        ..Default::default()
    };

    let settings = config.poll_settings();

    assert_eq!(settings.queue_timeout, Duration::from_secs(120));
    assert_eq!(settings.run_timeout, Duration::from_secs(5400));
    assert_eq!(settings.interval, Duration::from_secs(15));
    assert_eq!(config.http_timeout(), Duration::from_secs(60));
}

#[rstest]
fn pull_request_numbers_are_parsed_from_a_comma_list() {
    let config = TcTestConfig {
        prs: Some("42, #43,,44".to_owned()),
        ..Default::default()
    };

    let numbers: Vec<u64> = config
        .pull_request_numbers()
        .expect("numbers should parse")
        .into_iter()
        .map(PullRequestNumber::get)
        .collect();

    assert_eq!(numbers, vec![42, 43, 44]);
}

#[rstest]
#[case::missing(None, None)]
#[case::blank(Some(" , "), None)]
#[case::not_a_number(Some("42,abc"), Some(IntakeError::InvalidPullRequestNumber))]
fn invalid_pull_request_lists_are_rejected(
    #[case] prs: Option<&str>,
    #[case] intake: Option<IntakeError>,
) {
    let config = TcTestConfig {
        prs: prs.map(ToOwned::to_owned),
        ..Default::default()
    };

    let result = config.pull_request_numbers();

    match intake {
        Some(expected) => assert_eq!(result, Err(TcTestError::Intake(expected))),
        None => assert!(matches!(result, Err(TcTestError::Configuration { .. }))),
    }
}

#[rstest]
fn results_build_id_is_exposed() {
    let config = TcTestConfig {
        results: Some(1234),
        ..Default::default()
    };

    assert_eq!(config.require_build_id(), Ok(BuildId::new(1234)));
}

#[rstest]
fn repository_locator_honours_api_url() {
    let config = TcTestConfig {
        repo: Some("hashicorp/terraform-provider-azurerm".to_owned()),
        github_api_url: Some("https://github.example.com/api/v3".to_owned()),
        ..Default::default()
    };

    let locator = config.repository_locator().expect("locator should parse");

    assert_eq!(locator.slug(), "hashicorp/terraform-provider-azurerm");
    assert_eq!(
        locator.api_base().as_str(),
        "https://github.example.com/api/v3"
    );
}

#[rstest]
fn repository_is_required() {
    assert!(matches!(
        TcTestConfig::default().repository_locator(),
        Err(TcTestError::Configuration { .. })
    ));
}

#[rstest]
fn discovery_options_apply_defaults() {
    let options = TcTestConfig::default()
        .discovery_options()
        .expect("defaults should compile");

    assert_eq!(
        options.file_pattern.as_str(),
        "(^[a-z]*/resource_|^[a-z]*/data_source_)"
    );
    assert_eq!(options.split_delimiter, "_");
    assert_eq!(
        options.layout.service_directories,
        vec!["services".to_owned(), "service".to_owned()]
    );
    assert_eq!(options.empty_policy, EmptyCandidatePolicy::Fail);
}

#[rstest]
fn discovery_options_apply_overrides() {
    let config = TcTestConfig {
        file_pattern: Some("(resource_)".to_owned()),
        split_tests_on: Some("-".to_owned()),
        service_dirs: Some("providers".to_owned()),
        skip_dirs: Some(String::new()),
        skip_suffixes: Some("gen.go, mock.go".to_owned()),
        allow_no_matching_files: true,
        ..Default::default()
    };

    let options = config
        .discovery_options()
        .expect("overrides should compile");

    assert_eq!(options.split_delimiter, "-");
    assert_eq!(
        options.layout.service_directories,
        vec!["providers".to_owned()]
    );
    assert!(options.skip_rules.directories.is_empty());
    assert_eq!(
        options.skip_rules.file_suffixes,
        vec!["gen.go".to_owned(), "mock.go".to_owned()]
    );
    assert_eq!(options.empty_policy, EmptyCandidatePolicy::ReturnEmpty);
}

#[rstest]
fn invalid_file_pattern_is_an_intake_error() {
    let config = TcTestConfig {
        file_pattern: Some("(".to_owned()),
        ..Default::default()
    };

    assert!(matches!(
        config.discovery_options(),
        Err(TcTestError::Intake(IntakeError::InvalidPattern { .. }))
    ));
}

#[rstest]
fn filter_criteria_split_lists_and_windows() {
    let config = TcTestConfig {
        authors: Some("alice, bob".to_owned()),
        labels_any: Some("-wip,service/compute".to_owned()),
        milestone: Some("v4.0".to_owned()),
        updated_within_hours: Some(24),
        exclude_drafts: true,
        ..Default::default()
    };

    let criteria = config.filter_criteria().expect("criteria should convert");

    assert_eq!(criteria.authors, vec!["alice".to_owned(), "bob".to_owned()]);
    assert!(criteria.labels_all.is_empty());
    assert_eq!(
        criteria.labels_any,
        vec!["-wip".to_owned(), "service/compute".to_owned()]
    );
    assert_eq!(criteria.milestone.as_deref(), Some("v4.0"));
    assert_eq!(criteria.created_within, None);
    assert_eq!(criteria.updated_within, chrono::Duration::try_hours(24));
    assert!(criteria.exclude_drafts);
}

#[rstest]
fn oversized_hour_window_is_rejected() {
    let config = TcTestConfig {
        created_within_hours: Some(u64::MAX),
        ..Default::default()
    };

    assert!(matches!(
        config.filter_criteria(),
        Err(TcTestError::Configuration { .. })
    ));
}

#[rstest]
fn run_options_carry_build_settings() {
    let config = TcTestConfig {
        build_type_id: Some("PROVIDER".to_owned()),
        test_pattern: Some("TestAccFoo_".to_owned()),
        properties: Some("ARM_LOCATION=westeurope;PARALLELISM=4".to_owned()),
        tags: Some("nightly, manual".to_owned()),
        skip_queue: true,
        wait: true,
        ..Default::default()
    };

    let options = config.run_options().expect("options should convert");

    assert_eq!(options.build_type_id, "PROVIDER");
    assert_eq!(options.test_pattern.as_deref(), Some("TestAccFoo_"));
    assert_eq!(
        options.properties,
        vec![
            BuildProperty::new("ARM_LOCATION", "westeurope"),
            BuildProperty::new("PARALLELISM", "4"),
        ]
    );
    assert_eq!(options.tags, vec!["nightly".to_owned(), "manual".to_owned()]);
    assert!(options.queue_at_top);
    assert!(options.wait);
    assert!(!options.run_all);
}

#[rstest]
fn malformed_properties_are_rejected() {
    let config = TcTestConfig {
        build_type_id: Some("PROVIDER".to_owned()),
        properties: Some("NO_EQUALS".to_owned()),
        ..Default::default()
    };

    assert_eq!(
        config.run_options(),
        Err(TcTestError::Build(BuildError::InvalidProperty {
            property: "NO_EQUALS".to_owned()
        }))
    );
}
