//! Selection of test files worth downloading from a pull request's changes.

use std::collections::BTreeSet;

use regex::Regex;

use super::layout::SourceLayout;

/// Structural rules for changed files that never carry acceptance tests.
///
/// The rules only apply to paths inside a service directory; generated API
/// clients, parsers and validators live there alongside the resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRules {
    /// Directory names whose contents are ignored.
    pub directories: Vec<String>,
    /// File name suffixes that are ignored.
    pub file_suffixes: Vec<String>,
}

impl Default for SkipRules {
    fn default() -> Self {
        Self {
            directories: ["client", "parse", "validate"]
                .map(ToOwned::to_owned)
                .to_vec(),
            file_suffixes: ["registration.go", "resourceids.go"]
                .map(ToOwned::to_owned)
                .to_vec(),
        }
    }
}

impl SkipRules {
    /// A rule set that keeps every file.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            directories: Vec::new(),
            file_suffixes: Vec::new(),
        }
    }

    /// Returns true when `path` should be dropped before classification.
    #[must_use]
    pub fn is_skipped(&self, path: &str, layout: &SourceLayout) -> bool {
        if layout.service_for(path).is_empty() {
            return false;
        }

        let mut segments: Vec<&str> = path.split('/').collect();
        let file_name = segments.pop().unwrap_or_default();

        let in_skipped_directory = segments
            .iter()
            .any(|segment| self.directories.iter().any(|dir| dir == segment));
        let has_skipped_suffix = self
            .file_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()));

        in_skipped_directory || has_skipped_suffix
    }
}

/// Maps a changed path to the test file that should be scanned for it.
///
/// Test files are kept as they are. Source files matching `file_pattern` are
/// rewritten to their test counterpart. Anything else yields `None`.
#[must_use]
pub fn test_file_for(path: &str, file_pattern: &Regex, layout: &SourceLayout) -> Option<String> {
    if path.ends_with(layout.test_suffix.as_str()) {
        return Some(path.to_owned());
    }
    if !file_pattern.is_match(path) {
        return None;
    }
    path.strip_suffix(layout.source_extension.as_str())
        .map(|stem| format!("{stem}{}", layout.test_suffix))
}

/// Applies skip rules and classification, returning the distinct test files
/// in sorted order.
#[must_use]
pub fn select_candidates<'a>(
    paths: impl IntoIterator<Item = &'a str>,
    file_pattern: &Regex,
    skip_rules: &SkipRules,
    layout: &SourceLayout,
) -> BTreeSet<String> {
    paths
        .into_iter()
        .filter(|path| !skip_rules.is_skipped(path, layout))
        .filter_map(|path| test_file_for(path, file_pattern, layout))
        .collect()
}
