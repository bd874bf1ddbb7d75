//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use tctest::orchestrator::BuildReport;
use tctest::{
    BuildResults, PullRequest, PullRequestNumber, PullRequestRun, ServiceRun, ServiceTestMap,
    TcTestError,
};

/// Maps a write failure onto [`TcTestError::Io`].
pub fn io_error(error: &io::Error) -> TcTestError {
    TcTestError::Io {
        message: error.to_string(),
    }
}

fn service_suffix(service: &str) -> String {
    if service.is_empty() {
        String::new()
    } else {
        format!(" ({service})")
    }
}

/// Writes the tests discovered for one pull request, grouped by service.
pub fn write_discovered_tests<W: Write>(
    writer: &mut W,
    number: PullRequestNumber,
    tests: &ServiceTestMap,
) -> Result<(), TcTestError> {
    writeln!(writer, "Discovered tests for pr #{}:", number.get()).map_err(|e| io_error(&e))?;
    if tests.is_empty() {
        writeln!(writer, "  (none)").map_err(|e| io_error(&e))?;
    }
    for (service, names) in tests.iter() {
        let label = if service.is_empty() { "(root)" } else { service };
        writeln!(writer, "  {label}:").map_err(|e| io_error(&e))?;
        for name in names {
            writeln!(writer, "    {name}").map_err(|e| io_error(&e))?;
        }
    }
    writeln!(writer).map_err(|e| io_error(&e))
}

/// Writes an error that stopped a pull request from being processed.
pub fn write_pull_request_error<W: Write>(
    writer: &mut W,
    number: PullRequestNumber,
    error: &TcTestError,
) -> Result<(), TcTestError> {
    writeln!(writer, "pr #{}:", number.get()).map_err(|e| io_error(&e))?;
    writeln!(writer, "  ERROR: {error}").map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))
}

/// Writes every service build of one pull request, or why none ran.
pub fn write_pull_request_run<W: Write>(
    writer: &mut W,
    run: &PullRequestRun,
) -> Result<(), TcTestError> {
    match &run.outcome {
        Ok(services) => {
            writeln!(writer, "Running tests for pr #{}:", run.number.get())
                .map_err(|e| io_error(&e))?;
            for service in services {
                write_service_run(writer, service)?;
            }
            writeln!(writer).map_err(|e| io_error(&e))
        }
        Err(error) => write_pull_request_error(writer, run.number, error),
    }
}

/// Writes one triggered build and, when waited on, its results.
pub fn write_service_run<W: Write>(writer: &mut W, run: &ServiceRun) -> Result<(), TcTestError> {
    let plan = &run.plan;
    writeln!(
        writer,
        "triggering {}{} @ {}...",
        plan.branch,
        service_suffix(&plan.service),
        plan.build_type_id
    )
    .map_err(|e| io_error(&e))?;

    match &run.outcome {
        Ok(triggered) => {
            writeln!(
                writer,
                "  build {} queued: {} with {}",
                triggered.queued.id, triggered.queued.url, plan.test_pattern
            )
            .map_err(|e| io_error(&e))?;
            match &triggered.results {
                Some(results) => write_build_results(writer, results),
                None => Ok(()),
            }
        }
        Err(error) => writeln!(writer, "  ERROR: {error}").map_err(|e| io_error(&e)),
    }
}

fn write_result_lines<W: Write>(writer: &mut W, results: &BuildResults) -> Result<(), TcTestError> {
    if results.lines.is_empty() {
        writeln!(writer, "(no test results in log)").map_err(|e| io_error(&e))?;
    }
    for line in &results.lines {
        writeln!(writer, "{line}").map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes the results of a single build.
pub fn write_build_results<W: Write>(
    writer: &mut W,
    results: &BuildResults,
) -> Result<(), TcTestError> {
    writeln!(writer, "Test Results (buildID: {}):", results.build_id).map_err(|e| io_error(&e))?;
    if !results.is_complete() {
        writeln!(
            writer,
            "[WARN] build {} is still running, test results may be incomplete",
            results.build_id
        )
        .map_err(|e| io_error(&e))?;
    }
    write_result_lines(writer, results)
}

/// Writes the results of one build of a pull request.
pub fn write_build_report<W: Write>(
    writer: &mut W,
    number: PullRequestNumber,
    report: &BuildReport,
) -> Result<(), TcTestError> {
    let build = &report.build;
    writeln!(
        writer,
        "Test Results (buildID: {}, buildNumber: {}, branch: {}):",
        build.id,
        build.number.as_deref().unwrap_or("-"),
        build.branch.as_deref().unwrap_or("-")
    )
    .map_err(|e| io_error(&e))?;

    match &report.outcome {
        Ok(results) => {
            if !results.is_complete() {
                writeln!(
                    writer,
                    "[WARN] build (ID: {}) for PR {} is still running, test results may be incomplete",
                    build.id,
                    number.get()
                )
                .map_err(|e| io_error(&e))?;
            }
            if let Some(url) = build.web_url.as_deref() {
                writeln!(writer, "Build Log: {url}").map_err(|e| io_error(&e))?;
            }
            writeln!(writer).map_err(|e| io_error(&e))?;
            write_result_lines(writer, results)?;
        }
        Err(error) => writeln!(writer, "  ERROR: {error}").map_err(|e| io_error(&e))?,
    }
    writeln!(writer).map_err(|e| io_error(&e))
}

/// Writes the open pull requests that passed the filters.
pub fn write_pull_request_listing<W: Write>(
    writer: &mut W,
    slug: &str,
    total: usize,
    selected: &[PullRequest],
) -> Result<(), TcTestError> {
    writeln!(writer, "Retrieving all prs for {slug}... found {total}")
        .map_err(|e| io_error(&e))?;
    for pr in selected {
        let author = pr.author.as_deref().unwrap_or("unknown");
        let title = pr.title.as_deref().unwrap_or("(no title)");
        let labels = pr.labels.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        writeln!(writer, " #{} {author} {labels} - {title}", pr.number)
            .map_err(|e| io_error(&e))?;
    }
    writeln!(writer, "selected {} prs", selected.len()).map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))
}

#[cfg(test)]
mod tests {
    use tctest::orchestrator::{BuildReport, Completeness};
    use tctest::runner::{PlannedBuild, TriggeredBuild};
    use tctest::teamcity::{Build, BuildState, QueuedBuild};
    use tctest::{
        BuildError, BuildId, BuildResults, IntakeError, PullRequest, PullRequestNumber,
        PullRequestRun, ServiceRun, ServiceTestMap, TcTestError,
    };

    use super::{
        write_build_report, write_discovered_tests, write_pull_request_listing,
        write_pull_request_run,
    };

    fn pr(number: u64) -> PullRequestNumber {
        PullRequestNumber::new(number).expect("number should be valid")
    }

    fn rendered(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).expect("output should be UTF-8")
    }

    #[test]
    fn discovered_tests_are_grouped_by_service() {
        let mut tests = ServiceTestMap::new();
        tests.insert("foo", "TestAccFooX");
        tests.insert("bar", "TestAccBar");

        let mut buffer = Vec::new();
        write_discovered_tests(&mut buffer, pr(42), &tests).expect("write should succeed");

        assert_eq!(
            rendered(buffer),
            "Discovered tests for pr #42:\n  bar:\n    TestAccBar\n  foo:\n    TestAccFooX\n\n"
        );
    }

    #[test]
    fn service_runs_show_queue_links_and_errors() {
        let plan = |service: &str| PlannedBuild {
            service: service.to_owned(),
            build_type_id: format!("PROVIDER_{}", service.to_uppercase()),
            branch: "refs/pull/42/merge".to_owned(),
            test_pattern: "(TestAccFooX)".to_owned(),
        };
        let run = PullRequestRun {
            number: pr(42),
            outcome: Ok(vec![
                ServiceRun {
                    plan: plan("foo"),
                    outcome: Ok(TriggeredBuild {
                        queued: QueuedBuild {
                            id: BuildId::new(1234),
                            url: "https://ci.example.com/viewQueued.html?itemId=1234".to_owned(),
                        },
                        results: None,
                    }),
                },
                ServiceRun {
                    plan: plan("bar"),
                    outcome: Err(TcTestError::Build(BuildError::UnexpectedStatus {
                        operation: "trigger build",
                        status: 403,
                    })),
                },
            ]),
        };

        let mut buffer = Vec::new();
        write_pull_request_run(&mut buffer, &run).expect("write should succeed");
        let output = rendered(buffer);

        assert!(output.starts_with("Running tests for pr #42:\n"));
        assert!(output.contains("triggering refs/pull/42/merge (foo) @ PROVIDER_FOO...\n"));
        assert!(output.contains(
            "  build 1234 queued: https://ci.example.com/viewQueued.html?itemId=1234 with (TestAccFooX)\n"
        ));
        assert!(output.contains("triggering refs/pull/42/merge (bar) @ PROVIDER_BAR...\n  ERROR: "));
    }

    #[test]
    fn failed_pull_request_shows_its_error() {
        let run = PullRequestRun {
            number: pr(7),
            outcome: Err(IntakeError::ClosedPullRequest { number: 7 }.into()),
        };

        let mut buffer = Vec::new();
        write_pull_request_run(&mut buffer, &run).expect("write should succeed");

        assert_eq!(
            rendered(buffer),
            "pr #7:\n  ERROR: cannot start build for closed pull request #7\n\n"
        );
    }

    #[test]
    fn running_build_report_carries_a_warning() {
        let report = BuildReport {
            build: Build {
                id: BuildId::new(5),
                number: Some("77".to_owned()),
                branch: Some("refs/pull/42/merge".to_owned()),
                web_url: Some("https://ci.example.com/viewLog.html?buildId=5".to_owned()),
                state: BuildState::Running,
            },
            outcome: Ok(BuildResults {
                build_id: BuildId::new(5),
                lines: vec!["--- PASS: TestAccFoo (1.00s)".to_owned()],
                completeness: Completeness::Incomplete {
                    state: BuildState::Running,
                },
            }),
        };

        let mut buffer = Vec::new();
        write_build_report(&mut buffer, pr(42), &report).expect("write should succeed");

        assert_eq!(
            rendered(buffer),
            concat!(
                "Test Results (buildID: 5, buildNumber: 77, branch: refs/pull/42/merge):\n",
                "[WARN] build (ID: 5) for PR 42 is still running, test results may be incomplete\n",
                "Build Log: https://ci.example.com/viewLog.html?buildId=5\n",
                "\n",
                "--- PASS: TestAccFoo (1.00s)\n",
                "\n",
            )
        );
    }

    #[test]
    fn listing_shows_selected_pull_requests() {
        let selected = vec![PullRequest {
            number: 42,
            author: Some("alice".to_owned()),
            title: Some("Add resource X".to_owned()),
            labels: ["service/foo".to_owned()].into_iter().collect(),
            ..PullRequest::default()
        }];

        let mut buffer = Vec::new();
        write_pull_request_listing(&mut buffer, "owner/repo", 3, &selected)
            .expect("write should succeed");

        assert_eq!(
            rendered(buffer),
            "Retrieving all prs for owner/repo... found 3\n #42 alice service/foo - Add resource X\nselected 1 prs\n\n"
        );
    }
}
