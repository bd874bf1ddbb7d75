//! Maps Octocrab and raw HTTP failures onto [`IntakeError`].

use http::StatusCode;

use crate::github::error::IntakeError;

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> IntakeError {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            map_http_error(operation, source.status_code, Some(source.message.clone()))
        }
        octocrab::Error::Http { .. }
        | octocrab::Error::Hyper { .. }
        | octocrab::Error::Service { .. } => IntakeError::Network {
            message: format!("{operation}: {error}"),
        },
        _ => IntakeError::Api {
            message: format!("{operation}: {error}"),
        },
    }
}

/// 401 and 403 mean the token was missing, wrong or lacks access to the
/// repository; anything else is reported as an API failure.
pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    github_message: Option<String>,
) -> IntakeError {
    let detail = github_message.unwrap_or_else(|| "no message".to_owned());
    let message = format!("{operation}: GitHub returned {status}: {detail}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            IntakeError::Authentication { message }
        }
        _ => IntakeError::Api { message },
    }
}
