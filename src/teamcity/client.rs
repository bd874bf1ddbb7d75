//! REST client for the TeamCity build server.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::error::BuildError;
use super::models::{Build, BuildId, BuildRequest, BuildState, QueuedBuild};
use super::xml::{parse_builds, parse_queued_build_id, trigger_body};
use crate::github::PullRequestNumber;
use crate::http::{AuthMethod, HttpClient, HttpResponse};

const REST_PREFIX: &str = "/app/rest/2018.1";

/// Build-server operations used by the orchestrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildServer: Send + Sync {
    /// Queue a build and return its id and queued-build link.
    async fn trigger_build(&self, request: &BuildRequest) -> Result<QueuedBuild, BuildError>;

    /// Current lifecycle state. A 404 is [`BuildError::BuildNotFound`].
    async fn build_state(&self, build_id: BuildId) -> Result<BuildState, BuildError>;

    /// Full build log. A 404 is [`BuildError::BuildNotFound`].
    async fn build_log(&self, build_id: BuildId) -> Result<String, BuildError>;

    /// Whether the build is still waiting in the queue.
    async fn is_queued(&self, build_id: BuildId) -> Result<bool, BuildError>;

    /// Builds of `build_type_id` for a pull request's merge branch, newest
    /// first. `latest` limits the listing to one build.
    async fn builds_for_pull_request(
        &self,
        build_type_id: &str,
        number: PullRequestNumber,
        latest: bool,
    ) -> Result<Vec<Build>, BuildError>;
}

/// [`BuildServer`] backed by the TeamCity REST API.
#[derive(Debug, Clone)]
pub struct TeamCityClient {
    http: HttpClient,
    base: String,
}

impl TeamCityClient {
    /// Creates a client for `server`, which may be a bare host (HTTPS is
    /// assumed) or a full URL.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidServer`] for an unusable server value and
    /// [`BuildError::Network`] when the HTTP client cannot be built.
    pub fn new(server: &str, auth: AuthMethod, timeout: Duration) -> Result<Self, BuildError> {
        let base = server_base(server)?;
        tracing::debug!(server = base.as_str(), "configured build server");
        let http = HttpClient::new(auth, timeout)?;
        Ok(Self { http, base })
    }

    /// Normalised server URL without a trailing slash.
    #[must_use]
    pub const fn base(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

/// Normalises a configured server into a base URL.
///
/// # Errors
///
/// Returns [`BuildError::InvalidServer`] for empty values and values that do
/// not parse as a URL.
pub fn server_base(server: &str) -> Result<String, BuildError> {
    let trimmed = server.trim();
    if trimmed.is_empty() {
        return Err(BuildError::InvalidServer {
            server: server.to_owned(),
            message: "server must not be empty".to_owned(),
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&candidate).map_err(|error| BuildError::InvalidServer {
        server: server.to_owned(),
        message: error.to_string(),
    })?;
    Ok(parsed.as_str().trim_end_matches('/').to_owned())
}

fn unexpected(operation: &'static str, response: &HttpResponse) -> BuildError {
    BuildError::UnexpectedStatus {
        operation,
        status: response.status.as_u16(),
    }
}

#[async_trait]
impl BuildServer for TeamCityClient {
    async fn trigger_build(&self, request: &BuildRequest) -> Result<QueuedBuild, BuildError> {
        tracing::debug!(
            build_type = request.build_type_id.as_str(),
            branch = request.branch.as_str(),
            "triggering build"
        );
        let url = self.endpoint(&format!("{REST_PREFIX}/buildQueue"));
        let response = self
            .http
            .post(&url, "application/xml", trigger_body(request))
            .await?;
        if !response.is_ok() {
            return Err(unexpected("trigger build", &response));
        }

        let id = parse_queued_build_id(&response.body)?;
        Ok(QueuedBuild {
            id,
            url: self.endpoint(&format!("/viewQueued.html?itemId={id}")),
        })
    }

    async fn build_state(&self, build_id: BuildId) -> Result<BuildState, BuildError> {
        let url = self.endpoint(&format!("{REST_PREFIX}/builds/{build_id}/state"));
        let response = self.http.get(&url).await?;
        if response.is_not_found() {
            return Err(BuildError::BuildNotFound { build_id });
        }
        if !response.is_ok() {
            return Err(unexpected("build state", &response));
        }
        response.body.parse()
    }

    async fn build_log(&self, build_id: BuildId) -> Result<String, BuildError> {
        let url = self.endpoint(&format!("/downloadBuildLog.html?buildId={build_id}"));
        let response = self.http.get(&url).await?;
        if response.is_not_found() {
            return Err(BuildError::BuildNotFound { build_id });
        }
        if !response.is_ok() {
            return Err(unexpected("build log", &response));
        }
        Ok(response.body)
    }

    async fn is_queued(&self, build_id: BuildId) -> Result<bool, BuildError> {
        let url = self.endpoint(&format!("{REST_PREFIX}/buildQueue/id:{build_id}"));
        let response = self.http.get(&url).await?;
        if response.is_not_found() {
            return Ok(false);
        }
        if !response.is_ok() {
            return Err(unexpected("build queue", &response));
        }
        Ok(true)
    }

    async fn builds_for_pull_request(
        &self,
        build_type_id: &str,
        number: PullRequestNumber,
        latest: bool,
    ) -> Result<Vec<Build>, BuildError> {
        let mut locator = format!(
            "buildType:{build_type_id},branch:name:{},running:any",
            number.merge_ref()
        );
        if latest {
            locator.push_str(",count:1");
        }

        let mut url = Url::parse(&self.endpoint(&format!("{REST_PREFIX}/builds"))).map_err(
            |error| BuildError::InvalidServer {
                server: self.base.clone(),
                message: error.to_string(),
            },
        )?;
        url.query_pairs_mut().append_pair("locator", &locator);

        let response = self.http.get(url.as_str()).await?;
        let none_found = BuildError::NoBuildsForPullRequest {
            number: number.get(),
        };
        if response.is_not_found() {
            return Err(none_found);
        }
        if !response.is_ok() {
            return Err(unexpected("list builds", &response));
        }
        if response.body.trim().is_empty() {
            return Err(none_found);
        }

        let builds = parse_builds(&response.body)?;
        if builds.is_empty() {
            return Err(none_found);
        }
        Ok(builds)
    }
}
