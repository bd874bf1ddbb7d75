//! Composable predicates for narrowing the set of open pull requests.
//!
//! Each [`PullRequestFilter`] is a named, pure predicate. A [`FilterSet`]
//! combines them with logical AND and stops at the first failing filter.
//! Verdicts are logged at `debug` so a run can be audited with
//! `RUST_LOG=tctest=debug`.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use regex::{Regex, RegexBuilder};

use super::error::IntakeError;
use super::models::PullRequest;

/// Outcome of evaluating one filter against one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterVerdict {
    /// Whether the pull request passed.
    pub passed: bool,
    /// Human-readable reason.
    pub detail: String,
}

impl FilterVerdict {
    fn new(passed: bool, detail: impl Into<String>) -> Self {
        Self {
            passed,
            detail: detail.into(),
        }
    }
}

type Predicate = dyn Fn(&PullRequest) -> FilterVerdict + Send + Sync;

/// A named predicate over pull request metadata.
pub struct PullRequestFilter {
    name: &'static str,
    predicate: Box<Predicate>,
}

impl std::fmt::Debug for PullRequestFilter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PullRequestFilter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PullRequestFilter {
    /// Wraps a predicate under a display name.
    pub fn new<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&PullRequest) -> FilterVerdict + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Box::new(predicate),
        }
    }

    /// Filter name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn evaluate(&self, pull_request: &PullRequest) -> FilterVerdict {
        (self.predicate)(pull_request)
    }
}

/// How multiple label conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    /// Every condition must hold.
    All,
    /// At least one condition must hold.
    Any,
}

/// A label requirement; negated conditions require the label to be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCondition {
    /// Label name.
    pub label: String,
    /// True when written with a leading `-`.
    pub negated: bool,
}

impl LabelCondition {
    /// Parses `name` or `-name`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.strip_prefix('-') {
            Some(label) => Self {
                label: label.to_owned(),
                negated: true,
            },
            None => Self {
                label: trimmed.to_owned(),
                negated: false,
            },
        }
    }

    fn holds_for(&self, labels: &BTreeSet<String>) -> bool {
        labels.contains(&self.label) != self.negated
    }
}

/// User-facing filter settings, converted into a [`FilterSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Accepted author logins; empty accepts everyone.
    pub authors: Vec<String>,
    /// Labels that must all hold (`-label` negates).
    pub labels_all: Vec<String>,
    /// Labels of which at least one must hold (`-label` negates).
    pub labels_any: Vec<String>,
    /// Required milestone, or `-title` to exclude one.
    pub milestone: Option<String>,
    /// Only pull requests created within this window.
    pub created_within: Option<Duration>,
    /// Only pull requests updated within this window.
    pub updated_within: Option<Duration>,
    /// Case-insensitive regular expression applied to the title.
    pub title_pattern: Option<String>,
    /// Drop draft pull requests.
    pub exclude_drafts: bool,
}

/// Filters combined with logical AND.
#[derive(Debug, Default)]
pub struct FilterSet {
    filters: Vec<PullRequestFilter>,
}

impl FilterSet {
    /// Creates an empty set that accepts every pull request.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Builds the filters described by `criteria`, measuring recency windows
    /// back from `now`.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidPattern` when the title pattern does not
    /// compile.
    pub fn from_criteria(criteria: &FilterCriteria, now: DateTime<Utc>) -> Result<Self, IntakeError> {
        let mut set = Self::new();

        if !criteria.authors.is_empty() {
            set.push(authors(criteria.authors.iter().cloned().collect()));
        }
        if !criteria.labels_all.is_empty() {
            set.push(labels(parse_labels(&criteria.labels_all), LabelMatch::All));
        }
        if !criteria.labels_any.is_empty() {
            set.push(labels(parse_labels(&criteria.labels_any), LabelMatch::Any));
        }
        if let Some(milestone_title) = criteria.milestone.as_deref() {
            set.push(milestone(milestone_title));
        }
        if let Some(window) = criteria.created_within {
            set.push(created_after(now - window));
        }
        if let Some(window) = criteria.updated_within {
            set.push(updated_after(now - window));
        }
        if let Some(pattern) = criteria.title_pattern.as_deref() {
            set.push(title_matches(pattern)?);
        }
        if criteria.exclude_drafts {
            set.push(not_draft());
        }

        Ok(set)
    }

    /// Appends a filter.
    pub fn push(&mut self, filter: PullRequestFilter) {
        self.filters.push(filter);
    }

    /// Number of filters in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true when no filters are configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns true when every filter passes.
    #[must_use]
    pub fn passes(&self, pull_request: &PullRequest) -> bool {
        self.filters.iter().all(|filter| {
            let verdict = filter.evaluate(pull_request);
            tracing::debug!(
                pr = pull_request.number,
                filter = filter.name(),
                passed = verdict.passed,
                "{}",
                verdict.detail
            );
            verdict.passed
        })
    }

    /// Keeps the pull requests passing every filter, preserving order.
    #[must_use]
    pub fn apply(&self, pull_requests: Vec<PullRequest>) -> Vec<PullRequest> {
        pull_requests
            .into_iter()
            .filter(|pull_request| self.passes(pull_request))
            .collect()
    }
}

fn parse_labels(raw: &[String]) -> Vec<LabelCondition> {
    raw.iter()
        .map(|label| LabelCondition::parse(label))
        .filter(|condition| !condition.label.is_empty())
        .collect()
}

/// Accepts pull requests opened by one of `logins`.
#[must_use]
pub fn authors(logins: BTreeSet<String>) -> PullRequestFilter {
    PullRequestFilter::new("authors", move |pr| {
        let author = pr.author.as_deref().unwrap_or("");
        FilterVerdict::new(
            logins.contains(author),
            format!("author `{author}` checked against {} login(s)", logins.len()),
        )
    })
}

/// Applies label conditions in `All` or `Any` mode.
#[must_use]
pub fn labels(conditions: Vec<LabelCondition>, mode: LabelMatch) -> PullRequestFilter {
    let name = match mode {
        LabelMatch::All => "labels (all)",
        LabelMatch::Any => "labels (any)",
    };
    PullRequestFilter::new(name, move |pr| {
        let mut holding = conditions.iter().filter(|c| c.holds_for(&pr.labels));
        let passed = match mode {
            LabelMatch::All => holding.count() == conditions.len(),
            LabelMatch::Any => holding.next().is_some(),
        };
        let names: Vec<&str> = pr.labels.iter().map(String::as_str).collect();
        FilterVerdict::new(passed, format!("labels [{}]", names.join(", ")))
    })
}

/// Requires the milestone, or with a leading `-`, excludes it.
#[must_use]
pub fn milestone(raw: &str) -> PullRequestFilter {
    let (expected, negated) = raw.strip_prefix('-').map_or_else(
        || (raw.to_owned(), false),
        |title| (title.to_owned(), true),
    );
    PullRequestFilter::new("milestone", move |pr| {
        let actual = pr.milestone.as_deref().unwrap_or("");
        let matches = actual == expected;
        FilterVerdict::new(matches != negated, format!("milestone `{actual}`"))
    })
}

/// Accepts pull requests created strictly after `cutoff`.
#[must_use]
pub fn created_after(cutoff: DateTime<Utc>) -> PullRequestFilter {
    PullRequestFilter::new("created within", move |pr| {
        timestamp_verdict("created", pr.created_at, cutoff)
    })
}

/// Accepts pull requests updated strictly after `cutoff`.
#[must_use]
pub fn updated_after(cutoff: DateTime<Utc>) -> PullRequestFilter {
    PullRequestFilter::new("updated within", move |pr| {
        timestamp_verdict("updated", pr.updated_at, cutoff)
    })
}

fn timestamp_verdict(
    label: &str,
    timestamp: Option<DateTime<Utc>>,
    cutoff: DateTime<Utc>,
) -> FilterVerdict {
    timestamp.map_or_else(
        || FilterVerdict::new(false, format!("no {label} timestamp")),
        |at| FilterVerdict::new(at > cutoff, format!("{label} at {at}, cutoff {cutoff}")),
    )
}

/// Accepts titles matching `pattern`, ignoring case.
///
/// # Errors
///
/// Returns `IntakeError::InvalidPattern` when the pattern does not compile.
pub fn title_matches(pattern: &str) -> Result<PullRequestFilter, IntakeError> {
    let regex: Regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|error| IntakeError::InvalidPattern {
            pattern: pattern.to_owned(),
            message: error.to_string(),
        })?;
    Ok(PullRequestFilter::new("title", move |pr| {
        let title = pr.title.as_deref().unwrap_or("");
        FilterVerdict::new(regex.is_match(title), format!("title `{title}`"))
    }))
}

/// Rejects draft pull requests.
#[must_use]
pub fn not_draft() -> PullRequestFilter {
    PullRequestFilter::new("drafts", |pr| {
        FilterVerdict::new(!pr.draft, if pr.draft { "draft" } else { "ready" })
    })
}
