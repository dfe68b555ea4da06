//! Paging and sorting primitives shared by the ports and the HTTP layer.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Whitelisted sort columns. Keeping this a closed enum is what keeps the
/// ORDER BY clause out of user hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A zero-based page request. Defaults match the list views: ten rows,
/// newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: SortKey::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size: size.clamp(1, MAX_PAGE_SIZE), ..Self::default() }
    }

    pub fn sorted(mut self, sort: SortKey, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    /// Saturates on absurd page numbers and stays within `i64` so the
    /// value binds cleanly as an SQL OFFSET; pages past the end come back
    /// empty.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size).min(i64::MAX as usize)
    }
}

/// One page of results together with the totals the pagination bar needs.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self { items, page: request.page, size: request.size, total_elements }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Self { items: Vec::new(), page: request.page, size: request.size, total_elements: 0 }
    }

    pub fn total_pages(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        (self.total_elements as usize).div_ceil(self.size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
