//! Deduplicated `(service, test)` pairs grouped by service.

use std::collections::{BTreeMap, BTreeSet};

/// Discovered tests grouped by service.
///
/// Insertion is idempotent and order-independent; iteration is sorted by
/// service and then by test identifier. The empty service groups tests that
/// live outside any service directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceTestMap {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl ServiceTestMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Records `test` under `service`, returning false if it was already
    /// present.
    pub fn insert(&mut self, service: &str, test: &str) -> bool {
        self.entries
            .entry(service.to_owned())
            .or_default()
            .insert(test.to_owned())
    }

    /// Tests recorded for `service`.
    #[must_use]
    pub fn tests_for(&self, service: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(service)
    }

    /// Services in sorted order.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(service, tests)` groups in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries
            .iter()
            .map(|(service, tests)| (service.as_str(), tests))
    }

    /// Number of services with at least one test.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of `(service, test)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Returns true when no test was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the alternation pattern handed to the test runner, e.g.
/// `(TestAccFoo|TestAccBar)`.
#[must_use]
pub fn alternation_pattern<'a>(tests: impl IntoIterator<Item = &'a String>) -> String {
    let names: Vec<&str> = tests.into_iter().map(String::as_str).collect();
    format!("({})", names.join("|"))
}
