//! Shared test utilities for CLI tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tctest::github::{ChangedFile, ChangedFilesPage, PageInfo, PullRequestState};
use tctest::orchestrator::Clock;
use tctest::teamcity::{Build, BuildRequest, BuildState, QueuedBuild};
use tctest::{
    BuildError, BuildId, BuildServer, IntakeError, PullRequest, PullRequestGateway,
    PullRequestNumber, RepositoryLocator,
};

/// A pull request served by [`FakeGateway`].
#[derive(Clone)]
pub struct FakePullRequest {
    /// Metadata returned for the pull request.
    pub metadata: PullRequest,
    /// Changed file paths.
    pub files: Vec<String>,
}

impl FakePullRequest {
    /// An open pull request with a merge commit and the given changed files.
    pub fn open(number: u64, files: &[&str]) -> Self {
        Self {
            metadata: PullRequest {
                number,
                state: PullRequestState::Open,
                merge_commit_sha: Some(format!("merge-{number}")),
                ..PullRequest::default()
            },
            files: files.iter().map(|path| (*path).to_owned()).collect(),
        }
    }
}

/// A gateway serving pull requests and file contents from memory.
#[derive(Clone, Default)]
pub struct FakeGateway {
    /// Pull requests by number.
    pub pull_requests: BTreeMap<u64, FakePullRequest>,
    /// File contents by path, identical at every ref.
    pub contents: BTreeMap<String, String>,
}

impl FakeGateway {
    /// Adds a pull request.
    #[must_use]
    pub fn with_pull_request(mut self, pull_request: FakePullRequest) -> Self {
        self.pull_requests
            .insert(pull_request.metadata.number, pull_request);
        self
    }

    /// Adds a file.
    #[must_use]
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.contents.insert(path.to_owned(), content.to_owned());
        self
    }

    fn find(&self, number: PullRequestNumber) -> Result<&FakePullRequest, IntakeError> {
        self.pull_requests
            .get(&number.get())
            .ok_or_else(|| IntakeError::Api {
                message: format!("pull request {} not found", number.get()),
            })
    }
}

#[async_trait]
impl PullRequestGateway for FakeGateway {
    async fn pull_request(
        &self,
        _repository: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<PullRequest, IntakeError> {
        Ok(self.find(number)?.metadata.clone())
    }

    async fn changed_files(
        &self,
        _repository: &RepositoryLocator,
        number: PullRequestNumber,
        page: u32,
        per_page: u8,
    ) -> Result<ChangedFilesPage, IntakeError> {
        let files = if page == 1 {
            self.find(number)?
                .files
                .iter()
                .map(|path| ChangedFile { path: path.clone() })
                .collect()
        } else {
            Vec::new()
        };
        Ok(ChangedFilesPage {
            files,
            page_info: PageInfo::new(page, per_page),
        })
    }

    async fn open_pull_requests(
        &self,
        _repository: &RepositoryLocator,
    ) -> Result<Vec<PullRequest>, IntakeError> {
        Ok(self
            .pull_requests
            .values()
            .map(|pull_request| pull_request.metadata.clone())
            .collect())
    }

    async fn file_content(
        &self,
        _repository: &RepositoryLocator,
        path: &str,
        _git_ref: &str,
    ) -> Result<String, IntakeError> {
        self.contents.get(path).cloned().ok_or_else(|| IntakeError::Api {
            message: format!("{path} not found"),
        })
    }
}

/// A build server that queues every request and reports it finished.
#[derive(Clone, Default)]
pub struct FakeBuildServer {
    /// Requests received, in order.
    pub triggered: Arc<Mutex<Vec<BuildRequest>>>,
    /// Log returned for every build.
    pub log: String,
    /// Builds listed for every pull request.
    pub builds: Vec<Build>,
}

impl FakeBuildServer {
    /// Requests received so far.
    pub fn requests(&self) -> Vec<BuildRequest> {
        self.triggered
            .lock()
            .expect("trigger log should be available")
            .clone()
    }
}

#[async_trait]
impl BuildServer for FakeBuildServer {
    async fn trigger_build(&self, request: &BuildRequest) -> Result<QueuedBuild, BuildError> {
        let mut triggered = self
            .triggered
            .lock()
            .expect("trigger log should be available");
        triggered.push(request.clone());
        let id = 1000 + u64::try_from(triggered.len()).expect("count should fit");
        Ok(QueuedBuild {
            id: BuildId::new(id),
            url: format!("https://ci.example.com/viewQueued.html?itemId={id}"),
        })
    }

    async fn build_state(&self, _build_id: BuildId) -> Result<BuildState, BuildError> {
        Ok(BuildState::Finished)
    }

    async fn build_log(&self, _build_id: BuildId) -> Result<String, BuildError> {
        Ok(self.log.clone())
    }

    async fn is_queued(&self, _build_id: BuildId) -> Result<bool, BuildError> {
        Ok(false)
    }

    async fn builds_for_pull_request(
        &self,
        _build_type_id: &str,
        number: PullRequestNumber,
        _latest: bool,
    ) -> Result<Vec<Build>, BuildError> {
        if self.builds.is_empty() {
            return Err(BuildError::NoBuildsForPullRequest {
                number: number.get(),
            });
        }
        Ok(self.builds.clone())
    }
}

/// A clock that returns immediately.
#[derive(Clone, Copy, Default)]
pub struct InstantClock;

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, _duration: Duration) {}
}
