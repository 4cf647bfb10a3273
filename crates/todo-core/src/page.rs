use serde::{Deserialize, Serialize};

use crate::todo::Todo;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// A 1-based page request. Both fields are always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request, substituting defaults for missing values and clamping
    /// zero or negative values to 1.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: clamp(page, DEFAULT_PAGE),
            limit: clamp(limit, DEFAULT_LIMIT),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    /// `start..end` slice bounds into a collection of `len` items.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = self.offset().min(len);
        let end = (self.page as usize)
            .saturating_mul(self.limit as usize)
            .min(len);
        (start, end)
    }

    /// Number of pages needed for `total` items.
    pub fn page_count(&self, total: usize) -> u32 {
        total.div_ceil(self.limit as usize) as u32
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn clamp(value: Option<i64>, default: u32) -> u32 {
    match value {
        None => default,
        Some(v) if v < 1 => 1,
        Some(v) => u32::try_from(v).unwrap_or(u32::MAX),
    }
}

/// One page of todos plus totals, as returned by the list endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPage {
    pub total: usize,
    pub pages: u32,
    pub todos: Vec<Todo>,
}
