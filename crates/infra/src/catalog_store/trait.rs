use std::sync::Arc;

use thiserror::Error;

use shopfront_catalog::{Brand, Category, PageRequest, Predicate, ProductRecord, RankKey, SortMode};
use shopfront_core::ProductId;

/// Catalog store errors.
///
/// The discovery layer never retries; any of these aborts the current request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (pool closed, connection refused, poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed a query.
    #[error("query failed: {0}")]
    Query(String),

    /// A row came back in a shape the catalog model cannot represent.
    #[error("failed to decode row: {0}")]
    Decode(String),
}

/// Read-only access to the product, brand, and category tables.
///
/// Every method is a single statement against current store state; nothing is
/// cached between calls.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Number of products matching `predicate`.
    async fn count_products(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Products matching `predicate`, ordered by `order`.
    ///
    /// With `page = None` every matching row is returned.
    async fn fetch_products(
        &self,
        predicate: &Predicate,
        order: SortMode,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductRecord>, StoreError>;

    /// At most `cap` products matching `predicate`, best first under `key`.
    ///
    /// Bounded counterpart of `fetch_products` for capped result sets (search,
    /// suggestions, related products).
    async fn fetch_ranked(
        &self,
        predicate: &Predicate,
        key: &RankKey,
        cap: usize,
    ) -> Result<Vec<ProductRecord>, StoreError>;

    /// A single product by id (with its brand/category joins).
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError>;

    /// All brands, by name.
    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError>;

    /// All categories, by name.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn count_products(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        (**self).count_products(predicate).await
    }

    async fn fetch_products(
        &self,
        predicate: &Predicate,
        order: SortMode,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        (**self).fetch_products(predicate, order, page).await
    }

    async fn fetch_ranked(
        &self,
        predicate: &Predicate,
        key: &RankKey,
        cap: usize,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        (**self).fetch_ranked(predicate, key, cap).await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError> {
        (**self).find_product(id).await
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError> {
        (**self).list_brands().await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        (**self).list_categories().await
    }
}
