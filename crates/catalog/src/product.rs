use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{BrandId, CategoryId, DomainError, Entity, Price, ProductId};

/// Stock availability as stored on the product row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    InStock,
    OutOfStock,
    PreOrder,
    Discontinued,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::PreOrder => "pre_order",
            Availability::Discontinued => "discontinued",
        }
    }
}

impl FromStr for Availability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in_stock" => Ok(Availability::InStock),
            "out_of_stock" => Ok(Availability::OutOfStock),
            "pre_order" => Ok(Availability::PreOrder),
            "discontinued" => Ok(Availability::Discontinued),
            other => Err(DomainError::validation(format!("unknown availability: {other}"))),
        }
    }
}

/// A product row as read from the store, joined (outer) with its brand and category.
///
/// Brand/category columns are optional because the join is a LEFT JOIN: a product
/// whose brand or category was removed still lists, it just formats as "Unknown".
/// `specifications` and `gallery_images` are the raw serialized text columns; the
/// formatter decodes them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub price: Price,
    pub discount_price: Option<Price>,
    pub main_image: Option<String>,
    pub gallery_images: Option<String>,
    pub rating: f64,
    pub review_count: u32,
    pub availability: Availability,
    pub featured: bool,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub brand_id: Option<BrandId>,
    pub brand_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Minimal record: no brand, no category, no media, zero rating.
    pub fn new(id: ProductId, name: impl Into<String>, price: Price, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            model: None,
            description: None,
            specifications: None,
            price,
            discount_price: None,
            main_image: None,
            gallery_images: None,
            rating: 0.0,
            review_count: 0,
            availability: Availability::default(),
            featured: false,
            category_id: None,
            category_name: None,
            category_slug: None,
            brand_id: None,
            brand_name: None,
            created_at,
        }
    }

    pub fn with_brand(mut self, brand: &Brand) -> Self {
        self.brand_id = Some(brand.id);
        self.brand_name = Some(brand.name.clone());
        self
    }

    pub fn with_category(mut self, category: &Category) -> Self {
        self.category_id = Some(category.id);
        self.category_name = Some(category.name.clone());
        self.category_slug = Some(category.slug.clone());
        self
    }

    /// The price a customer pays: the discount price when one is set.
    pub fn display_price(&self) -> Price {
        self.discount_price.unwrap_or(self.price)
    }
}

impl Entity for ProductRecord {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Brand row. `name` is unique and doubles as the listing filter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

impl Brand {
    pub fn new(id: BrandId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            logo: None,
            website: None,
            description: None,
        }
    }
}

impl Entity for Brand {
    type Id = BrandId;

    fn id(&self) -> BrandId {
        self.id
    }
}

/// Category row. `slug` is unique and used both as filter key and URL component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}
