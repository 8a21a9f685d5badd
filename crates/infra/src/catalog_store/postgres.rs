//! Postgres-backed catalog store.
//!
//! Read-only adapter over the storefront's relational tables:
//!
//! ```sql
//! products   (id BIGSERIAL, name TEXT, model TEXT, description TEXT,
//!             specifications JSONB, price NUMERIC(10,2), discount_price NUMERIC(10,2),
//!             main_image TEXT, gallery_images JSONB, rating NUMERIC(3,2),
//!             review_count INT, availability TEXT, featured BOOLEAN,
//!             category_id BIGINT NULL, brand_id BIGINT NULL, created_at TIMESTAMPTZ)
//! brands     (id BIGSERIAL, name TEXT UNIQUE, logo TEXT, website TEXT, description TEXT)
//! categories (id BIGSERIAL, name TEXT, slug TEXT UNIQUE)
//! ```
//!
//! ## Predicate compilation
//!
//! A [`Predicate`] is compiled clause by clause into a `QueryBuilder` with bound
//! parameters; user input is never spliced into SQL text. The same compiled WHERE
//! clause feeds the COUNT query and the page query.
//!
//! Ranked reads (search, suggest, related) order by a CASE tier expression and
//! end in `LIMIT cap`, so only the top rows leave the database. Null `featured`
//! and `availability` columns read as `FALSE` and `in_stock`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | PoolClosed / PoolTimedOut / Io / Tls | `Unavailable` |
//! | ColumnDecode / Decode / ColumnNotFound / TypeNotFound | `Decode` |
//! | Database / other | `Query` |

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use shopfront_catalog::{
    Availability, Brand, Category, Clause, PageRequest, Predicate, ProductRecord, RankKey,
    RelevanceSecondary, SortMode, TextField,
};
use shopfront_core::{BrandId, CategoryId, Price, ProductId};

use super::r#trait::{CatalogStore, StoreError};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.model,
        p.description,
        p.specifications::TEXT AS specifications,
        ROUND(p.price * 100)::BIGINT AS price_cents,
        ROUND(p.discount_price * 100)::BIGINT AS discount_price_cents,
        p.main_image,
        p.gallery_images::TEXT AS gallery_images,
        COALESCE(p.rating, 0)::FLOAT8 AS rating,
        COALESCE(p.review_count, 0)::BIGINT AS review_count,
        COALESCE(p.availability, 'in_stock') AS availability,
        COALESCE(p.featured, FALSE) AS featured,
        p.category_id,
        c.name AS category_name,
        c.slug AS category_slug,
        p.brand_id,
        b.name AS brand_name,
        p.created_at
"#;

const PRODUCT_FROM: &str = r#"
    FROM products p
    LEFT JOIN brands b ON b.id = p.brand_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Price in cents, as compared by max-price and price-band clauses.
const PRICE_CENTS: &str = "ROUND(p.price * 100)::BIGINT";

const FEATURED_FIRST: &str = "COALESCE(p.featured, FALSE) DESC";

/// Postgres-backed read-only catalog store.
///
/// `Send + Sync` and cheap to clone; all queries go through the shared pool.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    #[instrument(skip(self, predicate), fields(clauses = predicate.clauses().len()), err)]
    pub async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total");
        qb.push(PRODUCT_FROM);
        push_where(&mut qb, predicate);

        let row = qb
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_products", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Decode(format!("failed to read count: {e}")))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    #[instrument(
        skip(self, predicate),
        fields(clauses = predicate.clauses().len(), sort = order.as_str()),
        err
    )]
    pub async fn fetch(
        &self,
        predicate: &Predicate,
        order: SortMode,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(PRODUCT_FROM);
        push_where(&mut qb, predicate);
        qb.push(order_by(order));

        if let Some(page) = page {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(page.limit()));
            qb.push(" OFFSET ");
            qb.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        }

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_products", e))?;

        decode_rows(rows)
    }

    #[instrument(
        skip(self, predicate, key),
        fields(clauses = predicate.clauses().len(), cap),
        err
    )]
    pub async fn fetch_top(
        &self,
        predicate: &Predicate,
        key: &RankKey,
        cap: usize,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let mut qb = ranked_query(predicate, key, cap);

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_ranked", e))?;

        decode_rows(rows)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn find(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(PRODUCT_FROM);
        qb.push(" WHERE p.id = ");
        qb.push_bind(id.get());

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.map(|r| decode_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    pub async fn brands(&self) -> Result<Vec<Brand>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, logo, website, description
            FROM brands
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_brands", e))?;

        rows.iter()
            .map(|row| {
                Ok(Brand {
                    id: BrandId::new(row.try_get("id").map_err(decode_err)?),
                    name: row.try_get("name").map_err(decode_err)?,
                    logo: row.try_get("logo").map_err(decode_err)?,
                    website: row.try_get("website").map_err(decode_err)?,
                    description: row.try_get("description").map_err(decode_err)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), err)]
    pub async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug
            FROM categories
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        rows.iter()
            .map(|row| {
                Ok(Category {
                    id: CategoryId::new(row.try_get("id").map_err(decode_err)?),
                    name: row.try_get("name").map_err(decode_err)?,
                    slug: row.try_get("slug").map_err(decode_err)?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn count_products(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.count(predicate).await
    }

    async fn fetch_products(
        &self,
        predicate: &Predicate,
        order: SortMode,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        self.fetch(predicate, order, page).await
    }

    async fn fetch_ranked(
        &self,
        predicate: &Predicate,
        key: &RankKey,
        cap: usize,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        self.fetch_top(predicate, key, cap).await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError> {
        self.find(id).await
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError> {
        self.brands().await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.categories().await
    }
}

/// Append ` WHERE c1 AND c2 ...`; nothing at all for an unconditional predicate.
fn push_where(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    for (i, clause) in predicate.clauses().iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_clause(qb, clause);
    }
}

fn push_clause(qb: &mut QueryBuilder<'_, Postgres>, clause: &Clause) {
    match clause {
        Clause::CategorySlug(slug) => {
            qb.push("c.slug = ");
            qb.push_bind(slug.clone());
        }
        Clause::BrandName(name) => {
            qb.push("b.name = ");
            qb.push_bind(name.clone());
        }
        Clause::TextContains { term, fields } => {
            let pattern = format!("%{}%", escape_like(term));
            qb.push("(");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(text_column(*field));
                qb.push(" ILIKE ");
                qb.push_bind(pattern.clone());
                qb.push(r" ESCAPE '\'");
            }
            qb.push(")");
        }
        Clause::MaxPrice(max) => {
            qb.push(PRICE_CENTS);
            qb.push(" <= ");
            qb.push_bind(cents(*max));
        }
        Clause::Related(affinity) => {
            qb.push("(");
            if let Some(category_id) = affinity.category_id {
                qb.push("p.category_id = ");
                qb.push_bind(category_id.get());
                qb.push(" OR ");
            }
            if let Some(brand_id) = affinity.brand_id {
                qb.push("p.brand_id = ");
                qb.push_bind(brand_id.get());
                qb.push(" OR ");
            }
            qb.push(PRICE_CENTS);
            qb.push(" BETWEEN ");
            qb.push_bind(cents(affinity.band.lower()));
            qb.push(" AND ");
            qb.push_bind(cents(affinity.band.upper()));
            qb.push(")");
        }
        Clause::ExcludeProduct(id) => {
            qb.push("p.id <> ");
            qb.push_bind(id.get());
        }
    }
}

fn text_column(field: TextField) -> &'static str {
    match field {
        TextField::Name => "p.name",
        TextField::Model => "p.model",
        TextField::Description => "p.description",
        TextField::BrandName => "b.name",
        TextField::CategoryName => "c.name",
    }
}

/// ORDER BY mirroring `SortMode::compare`, including the trailing id tiebreak.
fn order_by(mode: SortMode) -> &'static str {
    match mode {
        SortMode::PriceLow => " ORDER BY p.price ASC, p.id ASC",
        SortMode::PriceHigh => " ORDER BY p.price DESC, p.id ASC",
        SortMode::Rating => {
            " ORDER BY COALESCE(p.rating, 0) DESC, COALESCE(p.review_count, 0) DESC, p.id ASC"
        }
        SortMode::Newest => " ORDER BY p.created_at DESC, p.id ASC",
        SortMode::Featured => {
            " ORDER BY COALESCE(p.featured, FALSE) DESC, COALESCE(p.rating, 0) DESC, p.created_at DESC, p.id ASC"
        }
    }
}

/// SELECT ... WHERE ... ORDER BY <tier, secondary, id> LIMIT cap.
///
/// The CASE tiers mirror `RelevanceTier::classify` and `AffinityTier::classify`.
fn ranked_query<'a>(predicate: &Predicate, key: &RankKey, cap: usize) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
    qb.push(PRODUCT_FROM);
    push_where(&mut qb, predicate);

    match key {
        RankKey::Relevance { term, secondary } => {
            let lower = term.to_lowercase();
            let prefix = format!("{}%", escape_like(&lower));

            qb.push(" ORDER BY CASE WHEN LOWER(p.name) = ");
            qb.push_bind(lower);
            qb.push(" THEN 1 WHEN LOWER(p.name) LIKE ");
            qb.push_bind(prefix.clone());
            qb.push(r" ESCAPE '\' THEN 2 WHEN LOWER(b.name) LIKE ");
            qb.push_bind(prefix);
            qb.push(r" ESCAPE '\' THEN 3 ELSE 4 END, ");
            qb.push(FEATURED_FIRST);
            qb.push(match secondary {
                RelevanceSecondary::RatingDesc => ", COALESCE(p.rating, 0) DESC",
                RelevanceSecondary::NameAsc => r#", LOWER(p.name) COLLATE "C" ASC, p.name COLLATE "C" ASC"#,
            });
        }
        RankKey::Affinity { source, band } => {
            qb.push(" ORDER BY ");
            if source.category_id.is_some() || source.brand_id.is_some() {
                qb.push("CASE");
                if let (Some(category_id), Some(brand_id)) = (source.category_id, source.brand_id) {
                    qb.push(" WHEN p.category_id = ");
                    qb.push_bind(category_id.get());
                    qb.push(" AND p.brand_id = ");
                    qb.push_bind(brand_id.get());
                    qb.push(" THEN 1");
                }
                if let Some(category_id) = source.category_id {
                    qb.push(" WHEN p.category_id = ");
                    qb.push_bind(category_id.get());
                    qb.push(" THEN 2");
                }
                if let Some(brand_id) = source.brand_id {
                    qb.push(" WHEN p.brand_id = ");
                    qb.push_bind(brand_id.get());
                    qb.push(" THEN 3");
                }
                qb.push(" ELSE 4 END, ");
            }
            qb.push(FEATURED_FIRST);
            qb.push(", ABS(");
            qb.push(PRICE_CENTS);
            qb.push(" - ");
            qb.push_bind(cents(band.center()));
            qb.push(") ASC");
        }
    }

    qb.push(", p.id ASC LIMIT ");
    qb.push_bind(i64::try_from(cap).unwrap_or(i64::MAX));
    qb
}

/// Escape LIKE metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn cents(price: Price) -> i64 {
    i64::try_from(price.cents()).unwrap_or(i64::MAX)
}

fn decode_err(e: sqlx::Error) -> StoreError {
    StoreError::Decode(e.to_string())
}

struct ProductRow {
    id: i64,
    name: String,
    model: Option<String>,
    description: Option<String>,
    specifications: Option<String>,
    price_cents: i64,
    discount_price_cents: Option<i64>,
    main_image: Option<String>,
    gallery_images: Option<String>,
    rating: f64,
    review_count: i64,
    availability: String,
    featured: bool,
    category_id: Option<i64>,
    category_name: Option<String>,
    category_slug: Option<String>,
    brand_id: Option<i64>,
    brand_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            model: row.try_get("model")?,
            description: row.try_get("description")?,
            specifications: row.try_get("specifications")?,
            price_cents: row.try_get("price_cents")?,
            discount_price_cents: row.try_get("discount_price_cents")?,
            main_image: row.try_get("main_image")?,
            gallery_images: row.try_get("gallery_images")?,
            rating: row.try_get("rating")?,
            review_count: row.try_get("review_count")?,
            availability: row.try_get("availability")?,
            featured: row.try_get("featured")?,
            category_id: row.try_get("category_id")?,
            category_name: row.try_get("category_name")?,
            category_slug: row.try_get("category_slug")?,
            brand_id: row.try_get("brand_id")?,
            brand_name: row.try_get("brand_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<ProductRow> for ProductRecord {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = |cents: i64, column: &str| {
            u64::try_from(cents)
                .map(Price::from_cents)
                .map_err(|_| StoreError::Decode(format!("product {}: negative {column}", row.id)))
        };

        Ok(ProductRecord {
            id: ProductId::new(row.id),
            price: price(row.price_cents, "price")?,
            discount_price: row
                .discount_price_cents
                .map(|c| price(c, "discount_price"))
                .transpose()?,
            availability: decode_availability(row.id, &row.availability),
            review_count: u32::try_from(row.review_count.max(0)).unwrap_or(u32::MAX),
            category_id: row.category_id.map(CategoryId::new),
            brand_id: row.brand_id.map(BrandId::new),
            name: row.name,
            model: row.model,
            description: row.description,
            specifications: row.specifications,
            main_image: row.main_image,
            gallery_images: row.gallery_images,
            rating: row.rating,
            featured: row.featured,
            category_name: row.category_name,
            category_slug: row.category_slug,
            brand_name: row.brand_name,
            created_at: row.created_at,
        })
    }
}

/// Unknown availability values degrade to the default instead of failing the row.
fn decode_availability(id: i64, raw: &str) -> Availability {
    raw.parse().unwrap_or_else(|e| {
        tracing::debug!(product_id = id, error = %e, "unknown availability; using default");
        Availability::default()
    })
}

fn decode_row(row: &PgRow) -> Result<ProductRecord, StoreError> {
    ProductRow::from_row(row)
        .map_err(|e| StoreError::Decode(format!("failed to deserialize product row: {e}")))?
        .try_into()
}

fn decode_rows(rows: Vec<PgRow>) -> Result<Vec<ProductRecord>, StoreError> {
    rows.iter().map(decode_row).collect()
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {operation}: {e}")),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. } => {
            StoreError::Decode(format!("decode error in {operation}: {err}"))
        }
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
            StoreError::Query(format!(
                "database error in {operation} ({code}): {}",
                db_err.message()
            ))
        }
        other => StoreError::Query(format!("sqlx error in {operation}: {other}")),
    }
}
