//! Octocrab implementation of the pull request gateway.

use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::{Octocrab, Page};

use crate::github::error::IntakeError;
use crate::github::locator::{PersonalAccessToken, PullRequestNumber, RepositoryLocator};
use crate::github::models::{
    ApiChangedFile, ApiPullRequest, ChangedFile, ChangedFilesPage, PullRequest,
};
use crate::github::pagination::PageInfo;

use super::PullRequestGateway;
use super::client::build_octocrab_client;
use super::error_mapping::{map_http_error, map_octocrab_error};
use super::http_utils::{extract_github_message, raw_content_headers};

const OPEN_PULL_REQUESTS_PER_PAGE: &str = "100";

/// Octocrab-backed gateway.
pub struct OctocrabGateway {
    client: Octocrab,
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the repository's API base.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when the base URI cannot be parsed or
    /// `IntakeError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: Option<&PersonalAccessToken>,
        repository: &RepositoryLocator,
    ) -> Result<Self, IntakeError> {
        let octocrab = build_octocrab_client(token, repository.api_base().as_str())?;
        Ok(Self::new(octocrab))
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabGateway {
    async fn pull_request(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<PullRequest, IntakeError> {
        self.client
            .get::<ApiPullRequest, _, _>(repository.pull_request_path(number), None::<&()>)
            .await
            .map(ApiPullRequest::into)
            .map_err(|error| map_octocrab_error("pull request", &error))
    }

    async fn changed_files(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
        page: u32,
        per_page: u8,
    ) -> Result<ChangedFilesPage, IntakeError> {
        let page_str = page.to_string();
        let per_page_str = per_page.to_string();
        let query_params = [
            ("page", page_str.as_str()),
            ("per_page", per_page_str.as_str()),
        ];

        let page_result: Page<ApiChangedFile> = self
            .client
            .get(repository.pull_request_files_path(number), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("pull request files", &error))?;

        let page_info = PageInfo::new(page, per_page)
            .with_last_page(page_result.number_of_pages())
            .with_has_next(page_result.next.is_some());
        let files: Vec<ChangedFile> = page_result
            .items
            .into_iter()
            .map(ApiChangedFile::into)
            .collect();

        Ok(ChangedFilesPage { files, page_info })
    }

    async fn open_pull_requests(
        &self,
        repository: &RepositoryLocator,
    ) -> Result<Vec<PullRequest>, IntakeError> {
        let query_params = [
            ("state", "open"),
            ("per_page", OPEN_PULL_REQUESTS_PER_PAGE),
        ];
        let page = self
            .client
            .get::<Page<ApiPullRequest>, _, _>(repository.pulls_path(), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("list open pull requests", &error))?;

        self.client
            .all_pages(page)
            .await
            .map(|pulls| pulls.into_iter().map(ApiPullRequest::into).collect())
            .map_err(|error| map_octocrab_error("list open pull requests", &error))
    }

    async fn file_content(
        &self,
        repository: &RepositoryLocator,
        path: &str,
        git_ref: &str,
    ) -> Result<String, IntakeError> {
        let operation = format!("download {path}");
        let uri: Uri = repository
            .contents_path(path, git_ref)?
            .parse::<Uri>()
            .map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;

        let response = self
            .client
            ._get_with_headers(uri, Some(raw_content_headers()))
            .await
            .map_err(|error| map_octocrab_error(&operation, &error))?;

        let status = response.status();
        if status == StatusCode::OK {
            return self
                .client
                .body_to_string(response)
                .await
                .map_err(|error| IntakeError::Api {
                    message: format!("{operation} response decode failed: {error}"),
                });
        }

        let body = self
            .client
            .body_to_string(response)
            .await
            .unwrap_or_else(|_| String::new());
        Err(map_http_error(
            &operation,
            status,
            extract_github_message(&body),
        ))
    }
}
