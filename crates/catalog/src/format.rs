//! Result formatter: raw store rows → stable response projections.
//!
//! Formatting never fails. Malformed stored JSON (specifications, gallery)
//! degrades to an empty value for that field.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use shopfront_core::ProductId;

use crate::product::{Availability, ProductRecord};

/// Shown when a brand or category join came back empty.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Image path used when a product has no main image.
    pub placeholder_image: String,
    /// Storefront product page prefix; the id is appended.
    pub product_url_prefix: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            placeholder_image: "/assets/images/placeholder.png".to_string(),
            product_url_prefix: "/product/".to_string(),
        }
    }
}

/// Full product projection used by listings, related products, and detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub specifications: Map<String, Value>,
    pub price: String,
    pub discount_price: Option<String>,
    pub display_price: String,
    pub has_discount: bool,
    pub main_image: String,
    pub gallery_images: Vec<String>,
    pub rating: f64,
    pub review_count: u32,
    pub availability: Availability,
    pub featured: bool,
    pub brand_name: String,
    pub category_name: String,
    pub category_slug: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

/// Lightweight projection for the search box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: ProductId,
    pub name: String,
    pub brand_name: String,
    pub price: String,
    pub discount_price: Option<String>,
    pub main_image: String,
    pub category_slug: String,
    pub url: String,
}

/// Search hit plus the category name, for autocomplete suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionHit {
    #[serde(flatten)]
    pub hit: SearchHit,
    pub category_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResultFormatter {
    options: FormatOptions,
}

impl ResultFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn product_view(&self, record: &ProductRecord) -> ProductView {
        ProductView {
            id: record.id,
            name: record.name.clone(),
            model: record.model.clone(),
            description: record.description.clone(),
            specifications: decode_specifications(record.id, record.specifications.as_deref()),
            price: record.price.to_string(),
            discount_price: record.discount_price.map(|p| p.to_string()),
            display_price: record.display_price().to_string(),
            has_discount: record.discount_price.is_some(),
            main_image: self.main_image(record),
            gallery_images: decode_gallery(record.id, record.gallery_images.as_deref()),
            rating: record.rating,
            review_count: record.review_count,
            availability: record.availability,
            featured: record.featured,
            brand_name: name_or_unknown(record.brand_name.as_deref()),
            category_name: name_or_unknown(record.category_name.as_deref()),
            category_slug: record.category_slug.clone().unwrap_or_default(),
            created_at: record.created_at,
            url: self.url(record.id),
        }
    }

    pub fn search_hit(&self, record: &ProductRecord) -> SearchHit {
        SearchHit {
            id: record.id,
            name: record.name.clone(),
            brand_name: name_or_unknown(record.brand_name.as_deref()),
            price: record.price.to_string(),
            discount_price: record.discount_price.map(|p| p.to_string()),
            main_image: self.main_image(record),
            category_slug: record.category_slug.clone().unwrap_or_default(),
            url: self.url(record.id),
        }
    }

    pub fn suggestion(&self, record: &ProductRecord) -> SuggestionHit {
        SuggestionHit {
            hit: self.search_hit(record),
            category_name: name_or_unknown(record.category_name.as_deref()),
        }
    }

    fn main_image(&self, record: &ProductRecord) -> String {
        record
            .main_image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.options.placeholder_image.clone())
    }

    fn url(&self, id: ProductId) -> String {
        format!("{}{}", self.options.product_url_prefix, id)
    }
}

fn name_or_unknown(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Decode the stored specification text into a key/value mapping.
pub fn decode_specifications(id: ProductId, raw: Option<&str>) -> Map<String, Value> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::debug!(product_id = %id, "specifications are not a JSON object; ignoring");
            Map::new()
        }
        Err(e) => {
            tracing::debug!(product_id = %id, error = %e, "undecodable specifications; ignoring");
            Map::new()
        }
    }
}

/// Decode the stored gallery text into an ordered list of image references.
///
/// Only string entries are kept; anything that is not a JSON list yields `[]`.
pub fn decode_gallery(id: ProductId, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::debug!(product_id = %id, error = %e, "undecodable gallery; ignoring");
            Vec::new()
        }
    }
}
