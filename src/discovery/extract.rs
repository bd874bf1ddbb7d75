//! Test function extraction from downloaded file content.

use super::layout::SourceLayout;

/// Yields the raw name token of every test declaration in `content`.
///
/// A line declares a test when it contains the declaration keyword followed
/// by a whitespace-delimited token starting with the test prefix, e.g.
/// `func TestAccFoo_basic(t *testing.T)` yields `TestAccFoo_basic(t`.
pub fn test_declarations<'a>(
    content: &'a str,
    layout: &'a SourceLayout,
) -> impl Iterator<Item = &'a str> + 'a {
    content.lines().filter_map(move |line| {
        let (_, after_keyword) = line.split_once(layout.declaration_keyword.as_str())?;
        let token = after_keyword.split_whitespace().next()?;
        token
            .starts_with(layout.test_prefix.as_str())
            .then_some(token)
    })
}

/// Reduces a raw test name to its grouping identifier.
///
/// The name is cut at the first `delimiter` (when non-empty) and then at the
/// first `(`.
///
/// ```
/// use tctest::discovery::truncate_test_name;
///
/// assert_eq!(truncate_test_name("TestAccFoo_basic(t", "_"), "TestAccFoo");
/// assert_eq!(truncate_test_name("TestAccBar(t", "_"), "TestAccBar");
/// ```
#[must_use]
pub fn truncate_test_name<'a>(raw: &'a str, delimiter: &str) -> &'a str {
    let head = if delimiter.is_empty() {
        raw
    } else {
        raw.split_once(delimiter).map_or(raw, |(head, _)| head)
    };
    head.split_once('(').map_or(head, |(name, _)| name)
}
