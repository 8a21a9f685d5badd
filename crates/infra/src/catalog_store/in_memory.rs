//! In-memory catalog store for tests/dev.
//!
//! Products keep only their brand/category *ids*; names and slugs are joined at
//! read time, so removing a brand behaves like a LEFT JOIN against a missing row.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use shopfront_catalog::{Brand, Category, PageRequest, Predicate, ProductRecord, RankKey, SortMode};
use shopfront_core::{BrandId, CategoryId, ProductId};

use super::r#trait::{CatalogStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, ProductRecord>,
    brands: BTreeMap<BrandId, Brand>,
    categories: BTreeMap<CategoryId, Category>,
}

impl Tables {
    fn joined(&self, stored: &ProductRecord) -> ProductRecord {
        let mut row = stored.clone();

        let brand = stored.brand_id.and_then(|id| self.brands.get(&id));
        row.brand_name = brand.map(|b| b.name.clone());

        let category = stored.category_id.and_then(|id| self.categories.get(&id));
        row.category_name = category.map(|c| c.name.clone());
        row.category_slug = category.map(|c| c.slug.clone());

        row
    }

    fn matching<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = ProductRecord> + 'a {
        self.products
            .values()
            .map(move |p| self.joined(p))
            .filter(move |row| predicate.matches(row))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_brand(&self, brand: Brand) -> Result<(), StoreError> {
        self.write()?.brands.insert(brand.id, brand);
        Ok(())
    }

    pub fn upsert_category(&self, category: Category) -> Result<(), StoreError> {
        self.write()?.categories.insert(category.id, category);
        Ok(())
    }

    /// Insert or replace a product. Only its brand/category ids are kept; the
    /// joined columns are recomputed on every read.
    pub fn upsert_product(&self, product: ProductRecord) -> Result<(), StoreError> {
        let mut stored = product;
        stored.brand_name = None;
        stored.category_name = None;
        stored.category_slug = None;
        self.write()?.products.insert(stored.id, stored);
        Ok(())
    }

    pub fn remove_brand(&self, id: BrandId) -> Result<(), StoreError> {
        self.write()?.brands.remove(&id);
        Ok(())
    }

    pub fn remove_category(&self, id: CategoryId) -> Result<(), StoreError> {
        self.write()?.categories.remove(&id);
        Ok(())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory catalog lock poisoned".to_string()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory catalog lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn count_products(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let tables = self.read()?;
        Ok(tables.matching(predicate).count() as u64)
    }

    async fn fetch_products(
        &self,
        predicate: &Predicate,
        order: SortMode,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let mut rows: Vec<ProductRecord> = {
            let tables = self.read()?;
            tables.matching(predicate).collect()
        };
        order.sort(&mut rows);

        Ok(match page {
            Some(page) => page.window(&rows).to_vec(),
            None => rows,
        })
    }

    async fn fetch_ranked(
        &self,
        predicate: &Predicate,
        key: &RankKey,
        cap: usize,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let rows: Vec<ProductRecord> = {
            let tables = self.read()?;
            tables.matching(predicate).collect()
        };
        Ok(key.rank(rows, cap))
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError> {
        let tables = self.read()?;
        Ok(tables.products.get(&id).map(|p| tables.joined(p)))
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError> {
        let tables = self.read()?;
        let mut brands: Vec<Brand> = tables.brands.values().cloned().collect();
        brands.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(brands)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let tables = self.read()?;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shopfront_catalog::{PredicateBuilder, SearchCriteria};
    use shopfront_core::Price;

    fn seeded() -> InMemoryCatalogStore {
        let store = InMemoryCatalogStore::new();
        let acme = Brand::new(BrandId::new(1), "Acme");
        let phones = Category::new(CategoryId::new(1), "Phones", "phones");
        store.upsert_brand(acme.clone()).unwrap();
        store.upsert_category(phones.clone()).unwrap();

        for i in 1..=5 {
            let p = ProductRecord::new(ProductId::new(i), format!("Phone {i}"), Price::from_cents(i as u64 * 100), Utc::now())
                .with_brand(&acme)
                .with_category(&phones);
            store.upsert_product(p).unwrap();
        }
        store.upsert_product(ProductRecord::new(ProductId::new(6), "Orphan", Price::from_cents(50), Utc::now())).unwrap();
        store
    }

    #[tokio::test]
    async fn count_and_fetch_agree_on_the_filtered_set() {
        let store = seeded();
        let predicate = Predicate::for_listing(
            &SearchCriteria::new(PageRequest::first(10)).with_category(Some("phones")),
        );

        let total = store.count_products(&predicate).await.unwrap();
        let rows = store.fetch_products(&predicate, SortMode::PriceLow, None).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(rows.len() as u64, total);
    }

    #[tokio::test]
    async fn fetch_orders_then_windows() {
        let store = seeded();
        let page = PageRequest::new(2, 2).unwrap();
        let rows = store
            .fetch_products(&Predicate::all(), SortMode::PriceHigh, Some(page))
            .await
            .unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn removed_brand_reads_back_as_missing_join() {
        let store = seeded();
        store.remove_brand(BrandId::new(1)).unwrap();

        let row = store.find_product(ProductId::new(1)).await.unwrap().unwrap();
        assert_eq!(row.brand_id, Some(BrandId::new(1)));
        assert_eq!(row.brand_name, None);
        assert_eq!(row.category_slug.as_deref(), Some("phones"));

        let by_brand = PredicateBuilder::new().brand_name(Some("Acme")).build();
        assert_eq!(store.count_products(&by_brand).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn brands_and_categories_list_by_name() {
        let store = seeded();
        store.upsert_brand(Brand::new(BrandId::new(2), "Zeta")).unwrap();
        store.upsert_brand(Brand::new(BrandId::new(3), "Beta")).unwrap();

        let names: Vec<String> = store.list_brands().await.unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Acme", "Beta", "Zeta"]);
        assert_eq!(store.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_product_is_none() {
        assert!(seeded().find_product(ProductId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ranked_fetch_is_capped_and_ordered() {
        let store = seeded();
        let key = shopfront_catalog::RankKey::relevance("phone 2", shopfront_catalog::RelevanceSecondary::NameAsc);
        let rows = store
            .fetch_ranked(&Predicate::all(), &key, 2)
            .await
            .unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id.get()).collect();
        // Exact name first, then the rest by name: "Orphan" sorts before "Phone 1".
        assert_eq!(ids, vec![2, 6]);
    }

    #[test]
    fn writes_report_a_poisoned_lock() {
        let store = std::sync::Arc::new(seeded());
        let holder = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(
            store.upsert_brand(Brand::new(BrandId::new(9), "Late")),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(store.remove_category(CategoryId::new(1)), Err(StoreError::Unavailable(_))));
    }
}
