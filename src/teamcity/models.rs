//! Domain types for build requests and build state.

use std::fmt;
use std::str::FromStr;

use super::error::BuildError;

/// Server-assigned build identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildId(u64);

impl BuildId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for BuildId {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|error| BuildError::Decode {
                operation: "build id",
                message: format!("'{value}' is not a build id: {error}"),
            })
    }
}

/// Build lifecycle as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Waiting for an agent.
    Queued,
    /// Executing.
    Running,
    /// Done, whatever the outcome.
    Finished,
}

impl BuildState {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for BuildState {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "finished" => Ok(Self::Finished),
            other => Err(BuildError::Decode {
                operation: "build state",
                message: format!("unknown build state '{other}'"),
            }),
        }
    }
}

/// Extra parameter passed to a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProperty {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

impl BuildProperty {
    /// Creates a property.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses `KEY1=VALUE1;KEY2=VALUE2`. An empty input yields no properties.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidProperty`] for any entry that does not
    /// contain exactly one `=`.
    ///
    /// # Example
    ///
    /// ```
    /// use tctest::teamcity::BuildProperty;
    ///
    /// let parsed = BuildProperty::parse_list("A=1;B=2").expect("valid list");
    /// assert_eq!(parsed, vec![BuildProperty::new("A", "1"), BuildProperty::new("B", "2")]);
    /// assert!(BuildProperty::parse_list("A").is_err());
    /// ```
    pub fn parse_list(input: &str) -> Result<Vec<Self>, BuildError> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        input
            .split(';')
            .map(|entry| {
                let mut parts = entry.split('=');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(name), Some(value), None) => Ok(Self::new(name, value)),
                    _ => Err(BuildError::InvalidProperty {
                        property: entry.to_owned(),
                    }),
                }
            })
            .collect()
    }
}

/// Everything needed to queue one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Build configuration to run.
    pub build_type_id: String,
    /// Branch reference, e.g. `refs/pull/42/merge`.
    pub branch: String,
    /// Test selector handed to the runner.
    pub test_pattern: String,
    /// Extra parameters appended after the standard ones.
    pub properties: Vec<BuildProperty>,
    /// Tags attached to the build.
    pub tags: Vec<String>,
    /// Place the build at the top of the queue.
    pub queue_at_top: bool,
}

impl BuildRequest {
    /// Creates a request with no extras.
    #[must_use]
    pub fn new(
        build_type_id: impl Into<String>,
        branch: impl Into<String>,
        test_pattern: impl Into<String>,
    ) -> Self {
        Self {
            build_type_id: build_type_id.into(),
            branch: branch.into(),
            test_pattern: test_pattern.into(),
            properties: Vec::new(),
            tags: Vec::new(),
            queue_at_top: false,
        }
    }

    /// Appends extra parameters.
    #[must_use]
    pub fn with_properties(mut self, properties: impl IntoIterator<Item = BuildProperty>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Appends build tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Sets the queue-at-top flag.
    #[must_use]
    pub const fn with_queue_at_top(mut self, queue_at_top: bool) -> Self {
        self.queue_at_top = queue_at_top;
        self
    }
}

/// A build accepted into the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedBuild {
    /// Assigned identifier.
    pub id: BuildId,
    /// Link to the queued build page.
    pub url: String,
}

/// A build listed by locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    /// Assigned identifier.
    pub id: BuildId,
    /// Human-readable build number; queued builds have none.
    pub number: Option<String>,
    /// Branch the build ran on.
    pub branch: Option<String>,
    /// Link to the build page.
    pub web_url: Option<String>,
    /// Lifecycle state at listing time.
    pub state: BuildState,
}
