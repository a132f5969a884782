//! # List Query Helpers
//!
//! Pagination primitives shared by every repository's `list` method.
//!
//! ## Shape of a List Response
//! ```text
//! Page<T> {
//!     data:        the rows for the requested page
//!     total:       rows matching the filter across ALL pages
//!     page:        1-based page number actually served
//!     limit:       page size actually applied (after clamping)
//!     total_pages: ceil(total / limit)
//! }
//! ```
//! Out-of-range requests are clamped, never rejected: page 0 becomes page 1,
//! a limit of 10,000 becomes [`MAX_PAGE_SIZE`]. A page past the end simply
//! returns an empty `data` with the real `total`.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Hard ceiling on page size.
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// Pagination
// =============================================================================

/// Caller-supplied pagination parameters (1-based).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Pagination { page, limit }
    }

    /// Page number after clamping (always >= 1).
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size after clamping (1..=[`MAX_PAGE_SIZE`]).
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the clamped page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of list results plus the counts needed to render pagination.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Assembles a page from fetched rows and the filter-wide row count.
    pub fn new(data: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let limit = pagination.limit();
        let total_pages = if total <= 0 {
            0
        } else {
            ((total + i64::from(limit) - 1) / i64::from(limit)) as u32
        };

        Page {
            data,
            total,
            page: pagination.page(),
            limit,
            total_pages,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let p = Pagination::new(0, 0);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(3, 10_000);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 2 * i64::from(MAX_PAGE_SIZE));
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination::new(1, 10);
        assert_eq!(Page::<i32>::new(vec![], 0, &p).total_pages, 0);
        assert_eq!(Page::<i32>::new(vec![], 10, &p).total_pages, 1);
        assert_eq!(Page::<i32>::new(vec![], 11, &p).total_pages, 2);
        assert_eq!(Page::<i32>::new(vec![], 95, &p).total_pages, 10);
    }

    #[test]
    fn test_past_the_end_page_is_served_empty() {
        let p = Pagination::new(9, 10);
        let page = Page::<i32>::new(vec![], 15, &p);
        assert_eq!(page.page, 9);
        assert_eq!(page.total, 15);
        assert!(page.data.is_empty());
    }
}
