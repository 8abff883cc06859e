//! Page-based pagination for list endpoints.
//!
//! List requests carry `page` (1-indexed) and `page_size` in their JSON body.
//! Both are forgiving:
//! - `page = 0` (or missing) is treated as page 1
//! - `page_size = 0` (or missing) falls back to [`DEFAULT_PAGE_SIZE`]
//! - `page_size` is clamped to [`MAX_PAGE_SIZE`]
//!
//! Responses report `total_count` and `total_page`, see [`total_pages`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageParams {
    /// Page number, 1-indexed (0 is treated as 1)
    #[serde(default)]
    pub page: u32,
    /// Items per page (0 means the default of 10, capped at 100)
    #[serde(default)]
    pub page_size: u32,
}

impl PageParams {
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// The effective page number, at least 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// The effective page size, in `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        match self.page_size {
            0 => DEFAULT_PAGE_SIZE,
            size => size.min(MAX_PAGE_SIZE),
        }
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size())
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

/// Number of pages needed for `total` items, rounding up.
#[must_use]
pub fn total_pages(total: i64, page_size: u32) -> i64 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    let size = i64::from(page_size);
    (total + size - 1) / size
}
