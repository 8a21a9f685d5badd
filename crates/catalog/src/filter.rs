//! Filter builder: typed, composable predicates over catalog rows.
//!
//! A [`Predicate`] is a conjunction of [`Clause`]s, each carrying its own bound
//! parameter. Stores compile the clause list once into their native query form
//! (SQL with bind parameters, or direct evaluation in memory). An empty clause
//! list means "match everything"; absent criteria add no clause at all, so the
//! count query and the page query always see the same filtered set.

use shopfront_core::{BrandId, CategoryId, Price, ProductId};

use crate::criteria::SearchCriteria;
use crate::product::ProductRecord;
use crate::ranking::PriceBand;

/// A text column that free-text search may match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Name,
    Model,
    Description,
    BrandName,
    CategoryName,
}

impl TextField {
    /// Columns searched by listing and free-text search.
    pub const PRODUCT_TEXT: &'static [TextField] = &[
        TextField::Name,
        TextField::Model,
        TextField::Description,
        TextField::BrandName,
    ];

    /// Suggestions also match on category name.
    pub const SUGGEST_TEXT: &'static [TextField] = &[
        TextField::Name,
        TextField::Model,
        TextField::Description,
        TextField::BrandName,
        TextField::CategoryName,
    ];

    fn value<'a>(&self, record: &'a ProductRecord) -> Option<&'a str> {
        match self {
            TextField::Name => Some(record.name.as_str()),
            TextField::Model => record.model.as_deref(),
            TextField::Description => record.description.as_deref(),
            TextField::BrandName => record.brand_name.as_deref(),
            TextField::CategoryName => record.category_name.as_deref(),
        }
    }
}

/// Union of "same category", "same brand", and "price within band" relative to
/// a source product. Used to pre-select related-product candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedAffinity {
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub band: PriceBand,
}

impl RelatedAffinity {
    pub fn matches(&self, record: &ProductRecord) -> bool {
        let same_category = self.category_id.is_some() && record.category_id == self.category_id;
        let same_brand = self.brand_id.is_some() && record.brand_id == self.brand_id;
        same_category || same_brand || self.band.contains(record.price)
    }
}

/// One conjunct of a predicate, with its parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `category.slug = ?`
    CategorySlug(String),
    /// `brand.name = ?`
    BrandName(String),
    /// `field1 LIKE %?% OR field2 LIKE %?% ...` (case-insensitive)
    TextContains { term: String, fields: Vec<TextField> },
    /// `price <= ?`
    MaxPrice(Price),
    /// `(category = ? OR brand = ? OR price BETWEEN ? AND ?)`
    Related(RelatedAffinity),
    /// `id <> ?`
    ExcludeProduct(ProductId),
}

impl Clause {
    pub fn matches(&self, record: &ProductRecord) -> bool {
        match self {
            Clause::CategorySlug(slug) => record.category_slug.as_deref() == Some(slug.as_str()),
            Clause::BrandName(name) => record.brand_name.as_deref() == Some(name.as_str()),
            Clause::TextContains { term, fields } => {
                let needle = term.to_lowercase();
                fields.iter().any(|f| {
                    f.value(record)
                        .is_some_and(|v| v.to_lowercase().contains(&needle))
                })
            }
            Clause::MaxPrice(max) => record.price <= *max,
            Clause::Related(affinity) => affinity.matches(record),
            Clause::ExcludeProduct(id) => record.id != *id,
        }
    }
}

/// Conjunction of clauses. No clauses = unconditional match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_unconditional(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &ProductRecord) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    /// Listing predicate: category, brand, free text, and max price.
    pub fn for_listing(criteria: &SearchCriteria) -> Self {
        PredicateBuilder::new()
            .category_slug(criteria.category())
            .brand_name(criteria.brand())
            .text(criteria.search(), TextField::PRODUCT_TEXT)
            .max_price(criteria.max_price())
            .build()
    }

    /// Text-only predicate used by search and suggestions.
    pub fn for_text(term: &str, fields: &[TextField]) -> Self {
        PredicateBuilder::new().text(Some(term), fields).build()
    }

    /// Related-product candidates: anything sharing category or brand, or priced
    /// within `band`, excluding the source itself.
    pub fn for_related(source: &ProductRecord, band: PriceBand) -> Self {
        PredicateBuilder::new()
            .related_to(RelatedAffinity {
                category_id: source.category_id,
                brand_id: source.brand_id,
                band,
            })
            .exclude(source.id)
            .build()
    }
}

/// Accumulates clauses; `None` or blank inputs are skipped entirely.
#[derive(Debug, Default)]
pub struct PredicateBuilder {
    clauses: Vec<Clause>,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category_slug(mut self, slug: Option<&str>) -> Self {
        if let Some(slug) = non_blank(slug) {
            self.clauses.push(Clause::CategorySlug(slug.to_string()));
        }
        self
    }

    pub fn brand_name(mut self, name: Option<&str>) -> Self {
        if let Some(name) = non_blank(name) {
            self.clauses.push(Clause::BrandName(name.to_string()));
        }
        self
    }

    pub fn text(mut self, term: Option<&str>, fields: &[TextField]) -> Self {
        if let Some(term) = non_blank(term) {
            if !fields.is_empty() {
                self.clauses.push(Clause::TextContains {
                    term: term.to_string(),
                    fields: fields.to_vec(),
                });
            }
        }
        self
    }

    pub fn max_price(mut self, max: Option<Price>) -> Self {
        if let Some(max) = max {
            self.clauses.push(Clause::MaxPrice(max));
        }
        self
    }

    pub fn related_to(mut self, affinity: RelatedAffinity) -> Self {
        self.clauses.push(Clause::Related(affinity));
        self
    }

    pub fn exclude(mut self, id: ProductId) -> Self {
        self.clauses.push(Clause::ExcludeProduct(id));
        self
    }

    pub fn build(self) -> Predicate {
        Predicate {
            clauses: self.clauses,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
