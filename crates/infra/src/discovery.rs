//! Discovery engine: composes filter, ranking, pagination, and formatting per
//! storefront operation (listing, search, suggestions, related products).
//!
//! The engine holds no mutable state. Every call reads the store afresh; a
//! store failure aborts that call only.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use shopfront_catalog::{
    Brand, Category, FormatOptions, PageDefaults, PageMeta, Predicate, PriceBand, ProductRecord,
    ProductView, RankKey, RelevanceSecondary, ResultFormatter, SearchCriteria, SearchHit,
    SuggestionHit, TextField,
};
use shopfront_core::ProductId;

use crate::catalog_store::{CatalogStore, StoreError};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("catalog store error: {0}")]
    Store(#[from] StoreError),
}

/// Engine tuning. Defaults mirror the storefront's behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub page_defaults: PageDefaults,
    pub format: FormatOptions,
    /// Search terms shorter than this (in characters) return nothing.
    pub min_search_len: usize,
    /// Fixed cap on free-text search results.
    pub search_cap: usize,
    pub suggest_default_limit: usize,
    pub suggest_max_limit: usize,
    pub related_default_limit: usize,
    pub related_max_limit: usize,
    /// Half-width of the related-products price band, in percent.
    pub related_band_percent: u8,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_defaults: PageDefaults::default(),
            format: FormatOptions::default(),
            min_search_len: 2,
            search_cap: 10,
            suggest_default_limit: 5,
            suggest_max_limit: 20,
            related_default_limit: 6,
            related_max_limit: 24,
            related_band_percent: PriceBand::RELATED_PERCENT,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub products: Vec<ProductView>,
    pub pagination: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestOutcome {
    /// Blank query; nothing was looked up.
    EmptyQuery,
    Suggestions(Vec<SuggestionHit>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelatedOutcome {
    /// Identifier was not a positive integer; nothing was looked up.
    InvalidId,
    /// No product with that identifier.
    NotFound,
    Related {
        source: ProductId,
        products: Vec<ProductView>,
    },
}

#[derive(Debug)]
pub struct DiscoveryEngine<S> {
    store: S,
    config: DiscoveryConfig,
    formatter: ResultFormatter,
}

impl<S> DiscoveryEngine<S>
where
    S: CatalogStore,
{
    pub fn new(store: S, config: DiscoveryConfig) -> Self {
        let formatter = ResultFormatter::new(config.format.clone());
        Self {
            store,
            config,
            formatter,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Filtered, sorted, paginated listing. Count and page use the same predicate.
    #[instrument(
        skip(self, criteria),
        fields(
            sort = criteria.sort().as_str(),
            page = criteria.page().page(),
            limit = criteria.page().limit()
        ),
        err
    )]
    pub async fn list(&self, criteria: &SearchCriteria) -> Result<ListingPage, DiscoveryError> {
        let predicate = Predicate::for_listing(criteria);
        let page = criteria.page();

        let total = self.store.count_products(&predicate).await?;
        let rows = self
            .store
            .fetch_products(&predicate, criteria.sort(), Some(page))
            .await?;

        tracing::debug!(total, returned = rows.len(), "listing page fetched");

        Ok(ListingPage {
            products: rows.iter().map(|r| self.formatter.product_view(r)).collect(),
            pagination: PageMeta::compute(page, total),
        })
    }

    /// Search-box results: relevance-tiered, capped, no pagination.
    ///
    /// Terms shorter than the configured minimum return an empty list without
    /// touching the store.
    #[instrument(skip(self), err)]
    pub async fn search(&self, term: &str) -> Result<Vec<SearchHit>, DiscoveryError> {
        let term = term.trim();
        if term.chars().count() < self.config.min_search_len {
            return Ok(Vec::new());
        }

        let rows = self
            .ranked(
                &Predicate::for_text(term, TextField::PRODUCT_TEXT),
                &RankKey::relevance(term, RelevanceSecondary::RatingDesc),
                self.config.search_cap,
            )
            .await?;

        Ok(rows.iter().map(|r| self.formatter.search_hit(r)).collect())
    }

    /// Autocomplete suggestions; also matches category names.
    #[instrument(skip(self), err)]
    pub async fn suggest(&self, term: &str, limit: Option<usize>) -> Result<SuggestOutcome, DiscoveryError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(SuggestOutcome::EmptyQuery);
        }
        let limit = clamp_limit(
            limit,
            self.config.suggest_default_limit,
            self.config.suggest_max_limit,
        );

        let rows = self
            .ranked(
                &Predicate::for_text(term, TextField::SUGGEST_TEXT),
                &RankKey::relevance(term, RelevanceSecondary::NameAsc),
                limit,
            )
            .await?;

        Ok(SuggestOutcome::Suggestions(
            rows.iter().map(|r| self.formatter.suggestion(r)).collect(),
        ))
    }

    /// Products related to `raw_id` by category, brand, or price proximity.
    #[instrument(skip(self), err)]
    pub async fn related(&self, raw_id: i64, limit: Option<usize>) -> Result<RelatedOutcome, DiscoveryError> {
        let Ok(id) = ProductId::parse_positive(raw_id) else {
            return Ok(RelatedOutcome::InvalidId);
        };
        let limit = clamp_limit(
            limit,
            self.config.related_default_limit,
            self.config.related_max_limit,
        );

        let Some(source) = self.store.find_product(id).await? else {
            return Ok(RelatedOutcome::NotFound);
        };

        let band = PriceBand::around(source.price, self.config.related_band_percent);
        let rows = self
            .ranked(
                &Predicate::for_related(&source, band),
                &RankKey::affinity(&source, band),
                limit,
            )
            .await?;

        let products = rows
            .iter()
            .map(|r| self.formatter.product_view(r))
            .collect();

        Ok(RelatedOutcome::Related { source: id, products })
    }

    /// Single product detail; `None` for non-positive or unknown ids.
    #[instrument(skip(self), err)]
    pub async fn product(&self, raw_id: i64) -> Result<Option<ProductView>, DiscoveryError> {
        let Ok(id) = ProductId::parse_positive(raw_id) else {
            return Ok(None);
        };
        Ok(self
            .store
            .find_product(id)
            .await?
            .map(|r| self.formatter.product_view(&r)))
    }

    /// Bounded candidate fetch. The store picks the best `cap` rows; re-ranking
    /// them here keeps the tier order authoritative whatever the store's ORDER BY.
    async fn ranked(
        &self,
        predicate: &Predicate,
        key: &RankKey,
        cap: usize,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let rows = self.store.fetch_ranked(predicate, key, cap).await?;
        tracing::debug!(cap, returned = rows.len(), "ranked candidates fetched");
        Ok(key.rank(rows, cap))
    }

    pub async fn brands(&self) -> Result<Vec<Brand>, DiscoveryError> {
        Ok(self.store.list_brands().await?)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, DiscoveryError> {
        Ok(self.store.list_categories().await?)
    }
}

fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested
        .filter(|l| *l > 0)
        .unwrap_or(default)
        .clamp(1, max.max(1))
}
