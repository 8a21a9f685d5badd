//! Query parameters and response bodies.
//!
//! Query values arrive as raw strings and are parsed leniently: anything
//! malformed falls back to the default instead of rejecting the request.

use serde::{Deserialize, Serialize};

use shopfront_catalog::{
    PageDefaults, PageRequest, ProductView, SearchCriteria, SearchHit, SortMode,
    SuggestionHit,
};
use shopfront_core::Price;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListProductsQuery {
    pub fn to_criteria(&self, defaults: PageDefaults) -> SearchCriteria {
        let page = PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref(), defaults);
        SearchCriteria::new(page)
            .with_category(self.category.as_deref())
            .with_brand(self.brand.as_deref())
            .with_search(self.search.as_deref())
            .with_max_price(parse_price(self.max_price.as_deref()))
            .with_sort(SortMode::parse_lenient(self.sort.as_deref()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<String>,
}

/// Blank or malformed prices mean "no ceiling".
pub fn parse_price(raw: Option<&str>) -> Option<Price> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// Path ids that are not integers are treated like `0` (invalid).
pub fn parse_path_id(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

// -------------------------
// Response DTOs
// -------------------------

pub type SearchResponse = Vec<SearchHit>;

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub suggestions: Vec<SuggestionHit>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RelatedResponse {
    pub success: bool,
    pub products: Vec<ProductView>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelatedResponse {
    pub fn found(products: Vec<ProductView>) -> Self {
        Self {
            success: true,
            count: products.len(),
            products,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            products: Vec::new(),
            count: 0,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
