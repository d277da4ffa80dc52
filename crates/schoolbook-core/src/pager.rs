//! # Pager
//!
//! 1-based pagination over a list whose length changes as the search
//! changes. The current page is always within `1..=total_pages` (page 1 when
//! the list is empty).

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    current: usize,
    page_size: usize,
    total: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    /// A pager with the given page size (at least 1).
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            current: 1,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// `ceil(total / page_size)`; zero for an empty list.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// Update the item count, pulling the current page back in range.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.current = self.current.min(self.total_pages()).max(1);
    }

    /// Change the page size and go back to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current = 1;
    }

    pub fn first(&mut self) {
        self.current = 1;
    }

    /// Advance one page. Returns false on the last page.
    pub fn next(&mut self) -> bool {
        if self.current < self.total_pages() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns false on page 1.
    pub fn previous(&mut self) -> bool {
        if self.current > 1 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Index range of the current page within the list.
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = (self.current - 1)
            .saturating_mul(self.page_size)
            .min(self.total);
        let end = start.saturating_add(self.page_size).min(self.total);
        start..end
    }

    /// The current page's slice of `items`.
    pub fn page<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }
}
