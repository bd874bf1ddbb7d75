//! Position of one page within a paginated GitHub listing.

/// Where a page of changed files sits in the full listing.
///
/// GitHub advertises further pages through the `Link` header, so the page
/// only records whether one exists; callers keep requesting until
/// [`PageInfo::next_page`] returns `None`.
///
/// ```
/// use tctest::github::PageInfo;
///
/// let page = PageInfo::new(2, 100).with_has_next(true);
/// assert_eq!(page.next_page(), Some(3));
/// assert_eq!(PageInfo::new(3, 100).next_page(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    page: u32,
    per_page: u8,
    has_next: bool,
    last_page: Option<u32>,
}

impl PageInfo {
    /// Page `page` (1-based) of `per_page` items with nothing after it.
    #[must_use]
    pub const fn new(page: u32, per_page: u8) -> Self {
        Self {
            page,
            per_page,
            has_next: false,
            last_page: None,
        }
    }

    /// Records whether GitHub linked a following page.
    #[must_use]
    pub const fn with_has_next(mut self, has_next: bool) -> Self {
        self.has_next = has_next;
        self
    }

    /// Records the last page number when GitHub linked it.
    #[must_use]
    pub const fn with_last_page(mut self, last_page: Option<u32>) -> Self {
        self.last_page = last_page;
        self
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Last page number, if known.
    #[must_use]
    pub const fn last_page(&self) -> Option<u32> {
        self.last_page
    }

    /// Page to request next.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        if self.has_next {
            self.page.checked_add(1)
        } else {
            None
        }
    }
}
