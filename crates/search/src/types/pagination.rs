//! Pagination types for finder results.
//!
//! Pages are offset-based: a [`PageRequest`] names a zero-based page number and
//! a page size, and a [`Page`] carries the requested slice together with the
//! store's total hit count for the whole query.

use serde::{Deserialize, Serialize};

/// Default page size when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page number.
    pub page: u32,
    /// Maximum number of items in the page.
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Creates a request for page `page` of `size` items.
    pub fn of(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Creates a request for the first page of `size` items.
    pub fn of_size(size: u32) -> Self {
        Self::of(0, size)
    }

    /// Offset of the first item (`from` in the search body).
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Request for the following page.
    pub fn next(&self) -> Self {
        Self::of(self.page + 1, self.size)
    }

    /// Request for the preceding page, or the first page.
    pub fn previous_or_first(&self) -> Self {
        Self::of(self.page.saturating_sub(1), self.size)
    }

    /// Request for the first page with the same size.
    pub fn first(&self) -> Self {
        Self::of(0, self.size)
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    request: PageRequest,
    total_elements: u64,
}

impl<T> Page<T> {
    /// Creates a page from its items, the request that produced it and the total hit count.
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            request,
            total_elements,
        }
    }

    /// Creates an empty page.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Items in this page.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Consumes the page, returning its items.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Total matches across all pages, as reported by the store.
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Number of pages of the requested size needed for all matches.
    pub fn total_pages(&self) -> u64 {
        if self.request.size == 0 {
            return 1;
        }
        self.total_elements.div_ceil(u64::from(self.request.size))
    }

    /// Zero-based number of this page.
    pub fn number(&self) -> u32 {
        self.request.page
    }

    /// Requested page size.
    pub fn size(&self) -> u32 {
        self.request.size
    }

    /// Number of items actually in this page.
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns true if a later page has items.
    pub fn has_next(&self) -> bool {
        u64::from(self.request.page) + 1 < self.total_pages()
    }

    /// Returns true if this is not the first page.
    pub fn has_previous(&self) -> bool {
        self.request.page > 0
    }

    /// Request for the next page, if there is one.
    pub fn next_request(&self) -> Option<PageRequest> {
        self.has_next().then(|| self.request.next())
    }

    /// Returns the request that produced this page.
    pub fn request(&self) -> PageRequest {
        self.request
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total_elements: self.total_elements,
        }
    }

    /// Iterates over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}
