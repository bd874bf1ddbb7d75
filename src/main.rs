//! tctest CLI entrypoint: discover pull request acceptance tests and run them
//! on TeamCity.

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use tctest::{CancelToken, OperationMode, TcTestConfig, TcTestError};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so they never mix with results on stdout. `RUST_LOG`
/// overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), TcTestError> {
    let config = load_config()?;
    config.validate()?;
    let cancel = cancel_on_interrupt();

    match config.operation_mode() {
        OperationMode::Branch => cli::branch_build::run(&config, &cancel).await,
        OperationMode::PullRequests => cli::pull_requests::run(&config, &cancel).await,
        OperationMode::Discover => cli::discover::run(&config).await,
        OperationMode::OpenPullRequests => cli::open_pull_requests::run(&config, &cancel).await,
        OperationMode::BuildResults => cli::build_results::run(&config, &cancel).await,
        OperationMode::PullRequestResults => {
            cli::build_results::run_pull_requests(&config, &cancel).await
        }
        OperationMode::Unspecified => Err(TcTestError::configuration(
            "nothing to do: use --branch, --prs, --open-prs or --results (see --help)",
        )),
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`TcTestError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<TcTestConfig, TcTestError> {
    TcTestConfig::load().map_err(|error| TcTestError::configuration(error.to_string()))
}

/// Returns a token that is cancelled on the first Ctrl-C. Waits end and no
/// further builds are queued; a second Ctrl-C exits immediately.
fn cancel_on_interrupt() -> CancelToken {
    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("interrupted, no further builds will be queued (Ctrl-C again to exit)");
        on_interrupt.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    cancel
}
