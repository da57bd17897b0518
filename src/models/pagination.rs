use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A 1-based page request, clamped to `1..=MAX_PAGE_SIZE` items per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: i64,
    pub page_number: i64,
}

impl PageRequest {
    pub fn new(page_size: Option<i64>, page_number: Option<i64>) -> Self {
        Self {
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            page_number: page_number.unwrap_or(1).max(1),
        }
    }

    pub fn skip(&self) -> i64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// `?page_size=&page_number=` on list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(query.page_size, query.page_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub total_count: i64,
    pub page_size: i64,
    pub page_number: i64,
    pub total_pages: i64,
    pub skip: i64,
}

impl Pagination {
    pub fn new(page: PageRequest, total_count: i64) -> Self {
        Self {
            total_count,
            page_size: page.page_size,
            page_number: page.page_number,
            total_pages: total_count.saturating_add(page.page_size - 1) / page.page_size,
            skip: page.skip(),
        }
    }
}
