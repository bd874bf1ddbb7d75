//! Repository identity wrappers and API path construction.

use url::Url;

use super::error::IntakeError;

const PUBLIC_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, IntakeError> {
        if value.is_empty() {
            return Err(IntakeError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, IntakeError> {
        let trimmed = value.strip_suffix(".git").unwrap_or(value);
        if trimmed.is_empty() {
            return Err(IntakeError::MissingPathSegments);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Validates that the number is positive.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidPullRequestNumber` for zero.
    pub const fn new(value: u64) -> Result<Self, IntakeError> {
        if value == 0 {
            return Err(IntakeError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Parses a decimal pull request number, tolerating a leading `#`.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidPullRequestNumber` when the text is not a
    /// positive integer.
    pub fn parse(input: &str) -> Result<Self, IntakeError> {
        let trimmed = input.trim();
        trimmed
            .strip_prefix('#')
            .unwrap_or(trimmed)
            .parse::<u64>()
            .map_err(|_| IntakeError::InvalidPullRequestNumber)
            .and_then(Self::new)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Branch reference GitHub maintains for the merged pull request.
    #[must_use]
    pub fn merge_ref(self) -> String {
        format!("refs/pull/{}/merge", self.0)
    }
}

impl std::fmt::Display for PullRequestNumber {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, IntakeError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IntakeError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Derives the GitHub API base URL from a repository URL.
///
/// `github.com` maps onto the public API, any other host is treated as
/// GitHub Enterprise and served from `/api/v3`.
fn derive_api_base(parsed: &Url) -> Result<Url, IntakeError> {
    let host = parsed
        .host_str()
        .ok_or_else(|| IntakeError::InvalidUrl("URL must include a host".to_owned()))?;

    if host.eq_ignore_ascii_case("github.com") {
        return parse_url(PUBLIC_API_BASE);
    }

    let mut api_url = parsed.clone();
    api_url.set_path("api/v3");
    api_url.set_query(None);
    api_url.set_fragment(None);
    Ok(api_url)
}

fn parse_url(input: &str) -> Result<Url, IntakeError> {
    Url::parse(input).map_err(|error| IntakeError::InvalidUrl(error.to_string()))
}

/// A GitHub repository plus the API base used to reach it.
///
/// # Example
///
/// ```
/// use tctest::github::RepositoryLocator;
///
/// let locator = RepositoryLocator::parse("hashicorp/terraform-provider-azurerm")
///     .expect("should parse repository slug");
/// assert_eq!(locator.owner().as_str(), "hashicorp");
/// assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a locator for a `github.com` repository.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::MissingPathSegments` when owner or repo is empty.
    pub fn from_owner_repo(owner: &str, repo: &str) -> Result<Self, IntakeError> {
        Ok(Self {
            api_base: parse_url(PUBLIC_API_BASE)?,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repo)?,
        })
    }

    /// Parses either an `owner/name` slug or a repository URL such as
    /// `https://github.example.com/owner/name`.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when a URL cannot be parsed and
    /// `IntakeError::MissingPathSegments` when owner or name is missing.
    pub fn parse(input: &str) -> Result<Self, IntakeError> {
        let trimmed = input.trim();
        if !trimmed.contains("://") {
            let (owner, repo) = trimmed
                .split_once('/')
                .ok_or(IntakeError::MissingPathSegments)?;
            if repo.contains('/') {
                return Err(IntakeError::MissingPathSegments);
            }
            return Self::from_owner_repo(owner, repo);
        }

        let parsed = parse_url(trimmed)?;
        let mut segments = parsed
            .path_segments()
            .ok_or(IntakeError::MissingPathSegments)?;
        let owner = segments.next().ok_or(IntakeError::MissingPathSegments)?;
        let repo = segments.next().ok_or(IntakeError::MissingPathSegments)?;

        Ok(Self {
            api_base: derive_api_base(&parsed)?,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repo)?,
        })
    }

    /// Replaces the derived API base, for example with a GitHub Enterprise
    /// endpoint supplied through configuration.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when `api_base` is not a valid URL.
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, IntakeError> {
        self.api_base = parse_url(api_base)?;
        Ok(self)
    }

    /// API base URL used for requests.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// `owner/name` form for display.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    pub(crate) fn pulls_path(&self) -> String {
        format!("/repos/{}/pulls", self.slug())
    }

    pub(crate) fn pull_request_path(&self, number: PullRequestNumber) -> String {
        format!("{}/{}", self.pulls_path(), number.get())
    }

    pub(crate) fn pull_request_files_path(&self, number: PullRequestNumber) -> String {
        format!("{}/files", self.pull_request_path(number))
    }

    /// Relative contents path with each file path segment percent-encoded.
    pub(crate) fn contents_path(&self, file_path: &str, git_ref: &str) -> Result<String, IntakeError> {
        // Only the path and query of this URL are used; the host is a placeholder.
        let mut url = parse_url(PUBLIC_API_BASE)?;
        url.path_segments_mut()
            .map_err(|()| IntakeError::InvalidUrl("cannot build contents path".to_owned()))?
            .clear()
            .extend([
                "repos",
                self.owner.as_str(),
                self.repository.as_str(),
                "contents",
            ])
            .extend(file_path.split('/').filter(|segment| !segment.is_empty()));
        url.query_pairs_mut().append_pair("ref", git_ref);

        Ok(url.query().map_or_else(
            || url.path().to_owned(),
            |query| format!("{}?{query}", url.path()),
        ))
    }
}
