//! Pagination calculator: page/limit → offset, plus page metadata.

use serde::{Deserialize, Serialize};

use shopfront_core::{DomainError, DomainResult};

/// Listing page-size policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDefaults {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            default_limit: 12,
            max_limit: 100,
        }
    }
}

/// A validated page window (`page >= 1`, `limit >= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> DomainResult<Self> {
        if page == 0 {
            return Err(DomainError::validation("page must be >= 1"));
        }
        if limit == 0 {
            return Err(DomainError::validation("limit must be > 0"));
        }
        Ok(Self { page, limit })
    }

    /// First page with the given size (a zero size is bumped to 1).
    pub fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    /// Lenient construction from raw query values.
    ///
    /// Missing, non-numeric, or non-positive values fall back to page 1 and the
    /// default limit; limits above the configured maximum are clamped.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, defaults: PageDefaults) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<u32>().ok()).filter(|v| *v > 0);

        let max_limit = defaults.max_limit.max(1);
        Self {
            page: parse(page).unwrap_or(1),
            limit: parse(limit)
                .unwrap_or(defaults.default_limit)
                .clamp(1, max_limit),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// `(page - 1) * limit`
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// The rows of `rows` this page covers; empty past the end.
    pub fn window<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(rows.len());
        let end = start.saturating_add(self.limit as usize).min(rows.len());
        &rows[start..end]
    }
}

/// Page metadata returned alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn compute(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit));
        Self {
            current_page: request.page,
            per_page: request.limit,
            total,
            total_pages,
            has_next: u64::from(request.page) < total_pages,
            has_prev: request.page > 1,
        }
    }
}
