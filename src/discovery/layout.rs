//! Naming conventions of the repository being scanned.

/// File and declaration conventions used to find acceptance tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    /// Directory names whose child directory names a service.
    pub service_directories: Vec<String>,
    /// Suffix identifying test files.
    pub test_suffix: String,
    /// Extension of source files that have test counterparts.
    pub source_extension: String,
    /// Keyword preceding a function name in a declaration line.
    pub declaration_keyword: String,
    /// Prefix a function name must carry to count as a test.
    pub test_prefix: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            service_directories: vec!["services".to_owned(), "service".to_owned()],
            test_suffix: "_test.go".to_owned(),
            source_extension: ".go".to_owned(),
            declaration_keyword: "func ".to_owned(),
            test_prefix: "Test".to_owned(),
        }
    }
}

impl SourceLayout {
    /// Service owning `path`: the directory right after the first service
    /// directory segment, or the empty string when there is none.
    ///
    /// ```
    /// use tctest::discovery::SourceLayout;
    ///
    /// let layout = SourceLayout::default();
    /// assert_eq!(layout.service_for("internal/services/compute/vm_test.go"), "compute");
    /// assert_eq!(layout.service_for("main.go"), "");
    /// ```
    #[must_use]
    pub fn service_for<'a>(&self, path: &'a str) -> &'a str {
        let mut segments: Vec<&str> = path.split('/').collect();
        // The final segment is the file name and never names a service.
        segments.pop();

        segments
            .iter()
            .position(|segment| self.service_directories.iter().any(|dir| dir == segment))
            .and_then(|index| segments.get(index + 1))
            .copied()
            .unwrap_or_default()
    }
}
