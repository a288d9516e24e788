//! Page arithmetic for product listings.
//!
//! Pages are 1-based. Requests past the last page are valid and produce an
//! empty slice.

use serde::Serialize;

use crate::validation::ValidationError;

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl PageRequest {
    /// Builds a request from raw query values, applying defaults for missing ones.
    pub fn from_query(number: Option<i64>, size: Option<i64>) -> Result<Self, ValidationError> {
        let number = positive(
            "pageNumber",
            number.unwrap_or(i64::from(DEFAULT_PAGE_NUMBER)),
        )?;
        let size = positive("pageSize", size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)))?;
        Ok(Self { number, size })
    }

    pub fn number(self) -> u32 {
        self.number
    }

    pub fn size(self) -> u32 {
        self.size
    }

    /// Number of rows skipped before this page.
    pub fn offset(self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }

    /// Total pages needed to show `total_items` rows at this page size.
    pub fn total_pages(self, total_items: u64) -> u64 {
        total_items.div_ceil(u64::from(self.size))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn positive(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or(ValidationError::InvalidPaging { field, value })
}

/// One page of rows plus the numbers a pager needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, items: Vec<T>, total_items: u64) -> Self {
        Self {
            items,
            current_page: request.number(),
            total_pages: request.total_pages(total_items),
            total_items,
        }
    }
}
