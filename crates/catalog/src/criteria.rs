//! Per-request listing criteria.

use shopfront_core::Price;

use crate::pagination::PageRequest;
use crate::ranking::SortMode;

/// What a listing request asks for. Blank text values are stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    category: Option<String>,
    brand: Option<String>,
    search: Option<String>,
    max_price: Option<Price>,
    sort: SortMode,
    page: PageRequest,
}

impl SearchCriteria {
    pub fn new(page: PageRequest) -> Self {
        Self {
            category: None,
            brand: None,
            search: None,
            max_price: None,
            sort: SortMode::default(),
            page,
        }
    }

    pub fn with_category(mut self, slug: Option<&str>) -> Self {
        self.category = normalize(slug);
        self
    }

    pub fn with_brand(mut self, name: Option<&str>) -> Self {
        self.brand = normalize(name);
        self
    }

    pub fn with_search(mut self, term: Option<&str>) -> Self {
        self.search = normalize(term);
        self
    }

    pub fn with_max_price(mut self, max: Option<Price>) -> Self {
        self.max_price = max;
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn max_price(&self) -> Option<Price> {
        self.max_price
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
