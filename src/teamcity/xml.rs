//! XML bodies exchanged with the build server REST API.

use quick_xml::escape::escape;
use serde::Deserialize;

use super::error::BuildError;
use super::models::{Build, BuildId, BuildRequest};

/// Renders the `buildQueue` trigger body.
///
/// The branch is sent as both `teamcity.build.branch` and `BRANCH_NAME` and
/// the pattern as both `TEST_PATTERN` and `TEST_PREFIX`, so older and newer
/// build configurations pick them up.
#[must_use]
pub fn trigger_body(request: &BuildRequest) -> String {
    let mut body = String::from("<build>\n");
    body.push_str(&format!(
        "\t<triggeringOptions queueAtTop=\"{}\"/>\n",
        request.queue_at_top
    ));
    body.push_str(&format!(
        "\t<buildType id=\"{}\"/>\n",
        escape(request.build_type_id.as_str())
    ));

    body.push_str("\t<properties>\n");
    let standard = [
        ("teamcity.build.branch", request.branch.as_str()),
        ("BRANCH_NAME", request.branch.as_str()),
        ("TEST_PATTERN", request.test_pattern.as_str()),
        ("TEST_PREFIX", request.test_pattern.as_str()),
    ];
    let extra = request
        .properties
        .iter()
        .map(|property| (property.name.as_str(), property.value.as_str()));
    for (name, value) in standard.into_iter().chain(extra) {
        body.push_str(&format!(
            "\t\t<property name=\"{}\" value=\"{}\"/>\n",
            escape(name),
            escape(value)
        ));
    }
    body.push_str("\t</properties>\n");

    if !request.tags.is_empty() {
        body.push_str("\t<tags>\n");
        for tag in &request.tags {
            body.push_str(&format!("\t\t<tag name=\"{}\"/>\n", escape(tag.as_str())));
        }
        body.push_str("\t</tags>\n");
    }

    body.push_str("</build>\n");
    body
}

#[derive(Debug, Deserialize)]
struct ApiQueuedBuild {
    #[serde(rename = "@id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiBuilds {
    #[serde(rename = "build", default)]
    builds: Vec<ApiBuild>,
}

#[derive(Debug, Deserialize)]
struct ApiBuild {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@number", default)]
    number: Option<String>,
    #[serde(rename = "@state")]
    state: String,
    #[serde(rename = "@branchName", default)]
    branch_name: Option<String>,
    #[serde(rename = "@webUrl", default)]
    web_url: Option<String>,
}

impl TryFrom<ApiBuild> for Build {
    type Error = BuildError;

    fn try_from(value: ApiBuild) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.parse()?,
            number: value.number,
            branch: value.branch_name,
            web_url: value.web_url,
            state: value.state.parse()?,
        })
    }
}

/// Extracts the build id from a trigger response.
///
/// # Errors
///
/// Returns [`BuildError::Decode`] when the body is not a `<build id="..">`
/// element with a numeric id.
pub fn parse_queued_build_id(body: &str) -> Result<BuildId, BuildError> {
    let queued: ApiQueuedBuild =
        quick_xml::de::from_str(body).map_err(|error| BuildError::Decode {
            operation: "trigger build",
            message: error.to_string(),
        })?;
    queued.id.parse()
}

/// Decodes a `<builds>` listing.
///
/// # Errors
///
/// Returns [`BuildError::Decode`] for malformed XML, non-numeric ids or
/// unknown states.
pub fn parse_builds(body: &str) -> Result<Vec<Build>, BuildError> {
    let listing: ApiBuilds = quick_xml::de::from_str(body).map_err(|error| BuildError::Decode {
        operation: "list builds",
        message: error.to_string(),
    })?;
    listing.builds.into_iter().map(Build::try_from).collect()
}
