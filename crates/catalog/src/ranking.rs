//! Ranking policy: named sort modes, relevance tiers, and related-product affinity.
//!
//! Tiers are computed once per candidate and candidates are then sorted by
//! `(tier, secondary key)`, so the ordering does not depend on what the store
//! engine can express in an ORDER BY.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use shopfront_core::{Price, ValueObject};

use crate::product::ProductRecord;

/// Named listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Featured first, then best rated, then newest.
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    /// Best rated first, more reviews breaking rating ties.
    Rating,
    Newest,
}

impl SortMode {
    /// Parse a `sort` query value. Unknown or missing values mean `featured`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("price-low") => SortMode::PriceLow,
            Some("price-high") => SortMode::PriceHigh,
            Some("rating") => SortMode::Rating,
            Some("newest") => SortMode::Newest,
            _ => SortMode::Featured,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Featured => "featured",
            SortMode::PriceLow => "price-low",
            SortMode::PriceHigh => "price-high",
            SortMode::Rating => "rating",
            SortMode::Newest => "newest",
        }
    }

    /// Total order over records for this mode. Ties fall through to ascending id.
    pub fn compare(self, a: &ProductRecord, b: &ProductRecord) -> Ordering {
        let primary = match self {
            SortMode::PriceLow => a.price.cmp(&b.price),
            SortMode::PriceHigh => b.price.cmp(&a.price),
            SortMode::Rating => b
                .rating
                .total_cmp(&a.rating)
                .then_with(|| b.review_count.cmp(&a.review_count)),
            SortMode::Newest => b.created_at.cmp(&a.created_at),
            SortMode::Featured => b
                .featured
                .cmp(&a.featured)
                .then_with(|| b.rating.total_cmp(&a.rating))
                .then_with(|| b.created_at.cmp(&a.created_at)),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    pub fn sort(self, rows: &mut [ProductRecord]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}

/// Where a free-text term matched. Lower tiers rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelevanceTier {
    ExactName = 1,
    NamePrefix = 2,
    BrandPrefix = 3,
    Other = 4,
}

impl RelevanceTier {
    /// Classify a candidate against an already-lowercased term.
    pub fn classify(term_lower: &str, record: &ProductRecord) -> Self {
        let name = record.name.to_lowercase();
        if name == term_lower {
            RelevanceTier::ExactName
        } else if name.starts_with(term_lower) {
            RelevanceTier::NamePrefix
        } else if record
            .brand_name
            .as_deref()
            .is_some_and(|b| b.to_lowercase().starts_with(term_lower))
        {
            RelevanceTier::BrandPrefix
        } else {
            RelevanceTier::Other
        }
    }
}

/// Secondary key applied inside a relevance tier, after featured-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceSecondary {
    /// Search results: best rated first.
    RatingDesc,
    /// Suggestions: alphabetical.
    NameAsc,
}

/// Order search/suggestion candidates by relevance tier, then featured, then the
/// policy-specific key, then id.
pub fn rank_by_relevance(
    rows: Vec<ProductRecord>,
    term: &str,
    secondary: RelevanceSecondary,
) -> Vec<ProductRecord> {
    let term_lower = term.trim().to_lowercase();
    let mut keyed: Vec<(RelevanceTier, ProductRecord)> = rows
        .into_iter()
        .map(|r| (RelevanceTier::classify(&term_lower, &r), r))
        .collect();

    keyed.sort_by(|(ta, a), (tb, b)| {
        ta.cmp(tb)
            .then_with(|| b.featured.cmp(&a.featured))
            .then_with(|| match secondary {
                RelevanceSecondary::RatingDesc => b.rating.total_cmp(&a.rating),
                RelevanceSecondary::NameAsc => a
                    .name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.name.cmp(&b.name)),
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Inclusive price window of `±percent` around a center price.
///
/// Bounds are exact in cents: the lower bound rounds up and the upper bound
/// rounds down, so `contains(p)` is the same as `lower <= p <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    center: Price,
    percent: u8,
}

impl ValueObject for PriceBand {}

impl PriceBand {
    /// Width used for related products.
    pub const RELATED_PERCENT: u8 = 30;

    pub fn around(center: Price, percent: u8) -> Self {
        Self {
            center,
            percent: percent.min(100),
        }
    }

    pub fn center(&self) -> Price {
        self.center
    }

    pub fn lower(&self) -> Price {
        let scaled = u128::from(self.center.cents()) * u128::from(100 - self.percent);
        Price::from_cents(u64::try_from(scaled.div_ceil(100)).unwrap_or(u64::MAX))
    }

    pub fn upper(&self) -> Price {
        let scaled = u128::from(self.center.cents()) * (100 + u128::from(self.percent));
        Price::from_cents(u64::try_from(scaled / 100).unwrap_or(u64::MAX))
    }

    pub fn contains(&self, price: Price) -> bool {
        self.lower() <= price && price <= self.upper()
    }
}

/// How closely a candidate relates to the source product. Lower tiers rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AffinityTier {
    CategoryAndBrand = 1,
    CategoryOnly = 2,
    BrandOnly = 3,
    PriceBand = 4,
}

impl AffinityTier {
    /// `None` means the candidate is unrelated and must not be shown.
    pub fn classify(source: &ProductRecord, band: &PriceBand, candidate: &ProductRecord) -> Option<Self> {
        let same_category = source.category_id.is_some() && source.category_id == candidate.category_id;
        let same_brand = source.brand_id.is_some() && source.brand_id == candidate.brand_id;

        match (same_category, same_brand) {
            (true, true) => Some(AffinityTier::CategoryAndBrand),
            (true, false) => Some(AffinityTier::CategoryOnly),
            (false, true) => Some(AffinityTier::BrandOnly),
            (false, false) if band.contains(candidate.price) => Some(AffinityTier::PriceBand),
            (false, false) => None,
        }
    }
}

/// Keep related candidates in affinity order, dropping the source itself and any
/// unrelated row, then truncate to `limit`.
pub fn rank_by_affinity(
    source: &ProductRecord,
    band: &PriceBand,
    candidates: Vec<ProductRecord>,
    limit: usize,
) -> Vec<ProductRecord> {
    let mut keyed: Vec<(AffinityTier, u64, ProductRecord)> = candidates
        .into_iter()
        .filter(|c| c.id != source.id)
        .filter_map(|c| {
            AffinityTier::classify(source, band, &c).map(|tier| (tier, c.price.abs_diff(source.price), c))
        })
        .collect();

    keyed.sort_by(|(ta, da, a), (tb, db, b)| {
        ta.cmp(tb)
            .then_with(|| b.featured.cmp(&a.featured))
            .then_with(|| da.cmp(db))
            .then_with(|| a.id.cmp(&b.id))
    });

    keyed.into_iter().take(limit).map(|(_, _, c)| c).collect()
}

/// Ranking applied to a bounded candidate set.
///
/// Stores use it to select the best `cap` candidates (SQL ORDER BY + LIMIT, or
/// ranking in memory); the engine re-applies [`RankKey::rank`] to the rows it
/// gets back, so the tier enums above stay the single ordering definition.
#[derive(Debug, Clone, PartialEq)]
pub enum RankKey {
    Relevance {
        term: String,
        secondary: RelevanceSecondary,
    },
    Affinity {
        source: Box<ProductRecord>,
        band: PriceBand,
    },
}

impl RankKey {
    pub fn relevance(term: &str, secondary: RelevanceSecondary) -> Self {
        RankKey::Relevance {
            term: term.trim().to_string(),
            secondary,
        }
    }

    pub fn affinity(source: &ProductRecord, band: PriceBand) -> Self {
        RankKey::Affinity {
            source: Box::new(source.clone()),
            band,
        }
    }

    /// Order `rows` and keep at most `cap` of them.
    pub fn rank(&self, rows: Vec<ProductRecord>, cap: usize) -> Vec<ProductRecord> {
        match self {
            RankKey::Relevance { term, secondary } => {
                let mut ranked = rank_by_relevance(rows, term, *secondary);
                ranked.truncate(cap);
                ranked
            }
            RankKey::Affinity { source, band } => rank_by_affinity(source, band, rows, cap),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use shopfront_core::{BrandId, CategoryId, ProductId};

    use crate::product::{Brand, Category};

    fn rec(id: i64, name: &str, cents: u64) -> ProductRecord {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ProductRecord::new(ProductId::new(id), name, Price::from_cents(cents), base + Duration::days(id))
    }

    fn ids(rows: &[ProductRecord]) -> Vec<i64> {
        rows.iter().map(|r| r.id.get()).collect()
    }

    #[test]
    fn parse_lenient_maps_known_modes_and_defaults_to_featured() {
        assert_eq!(SortMode::parse_lenient(Some("price-low")), SortMode::PriceLow);
        assert_eq!(SortMode::parse_lenient(Some("price-high")), SortMode::PriceHigh);
        assert_eq!(SortMode::parse_lenient(Some("rating")), SortMode::Rating);
        assert_eq!(SortMode::parse_lenient(Some("newest")), SortMode::Newest);
        assert_eq!(SortMode::parse_lenient(Some("featured")), SortMode::Featured);
        assert_eq!(SortMode::parse_lenient(Some("cheapest")), SortMode::Featured);
        assert_eq!(SortMode::parse_lenient(None), SortMode::Featured);
    }

    #[test]
    fn price_modes_break_ties_by_id() {
        let mut rows = vec![rec(3, "c", 500), rec(1, "a", 500), rec(2, "b", 100)];
        SortMode::PriceLow.sort(&mut rows);
        assert_eq!(ids(&rows), vec![2, 1, 3]);

        SortMode::PriceHigh.sort(&mut rows);
        assert_eq!(ids(&rows), vec![1, 3, 2]);
    }

    #[test]
    fn rating_mode_uses_review_count_as_tiebreak() {
        let mut a = rec(1, "a", 100);
        a.rating = 4.5;
        a.review_count = 3;
        let mut b = rec(2, "b", 100);
        b.rating = 4.5;
        b.review_count = 40;
        let mut c = rec(3, "c", 100);
        c.rating = 4.9;

        let mut rows = vec![a, b, c];
        SortMode::Rating.sort(&mut rows);
        assert_eq!(ids(&rows), vec![3, 2, 1]);
    }

    #[test]
    fn newest_mode_orders_by_creation_desc() {
        let mut rows = vec![rec(1, "a", 1), rec(3, "c", 1), rec(2, "b", 1)];
        SortMode::Newest.sort(&mut rows);
        assert_eq!(ids(&rows), vec![3, 2, 1]);
    }

    #[test]
    fn featured_mode_orders_featured_then_rating_then_newest() {
        let mut plain_top_rated = rec(1, "a", 1);
        plain_top_rated.rating = 5.0;
        let mut featured_old = rec(2, "b", 1);
        featured_old.featured = true;
        featured_old.rating = 3.0;
        let mut featured_new = rec(3, "c", 1);
        featured_new.featured = true;
        featured_new.rating = 3.0;

        let mut rows = vec![plain_top_rated, featured_old, featured_new];
        SortMode::Featured.sort(&mut rows);
        assert_eq!(ids(&rows), vec![3, 2, 1]);
    }

    #[test]
    fn relevance_tiers_exact_then_name_prefix_then_brand_prefix() {
        let gear = Brand::new(BrandId::new(1), "Pro Gear");
        let other = rec(4, "Studio Monitor Pro", 100);
        let brand_match = rec(3, "Headset", 100).with_brand(&gear);
        let prefix = rec(2, "Pro Max", 100);
        let exact = rec(1, "Pro", 100);

        let ranked = rank_by_relevance(
            vec![other, brand_match, prefix, exact],
            "Pro",
            RelevanceSecondary::RatingDesc,
        );
        assert_eq!(ids(&ranked), vec![1, 2, 3, 4]);
    }

    #[test]
    fn relevance_tiers_ignore_case() {
        assert_eq!(RelevanceTier::classify("pro", &rec(1, "PRO", 1)), RelevanceTier::ExactName);
        assert_eq!(RelevanceTier::classify("pro", &rec(1, "Professional", 1)), RelevanceTier::NamePrefix);
    }

    #[test]
    fn within_tier_featured_wins_then_policy_key() {
        let mut low = rec(1, "Pro B", 100);
        low.rating = 2.0;
        let mut high = rec(2, "Pro A", 100);
        high.rating = 4.0;
        let mut featured = rec(3, "Pro C", 100);
        featured.featured = true;

        let by_rating = rank_by_relevance(
            vec![low.clone(), high.clone(), featured.clone()],
            "pro",
            RelevanceSecondary::RatingDesc,
        );
        assert_eq!(ids(&by_rating), vec![3, 2, 1]);

        let by_name = rank_by_relevance(vec![low, high, featured], "pro", RelevanceSecondary::NameAsc);
        assert_eq!(ids(&by_name), vec![3, 2, 1]);
    }

    #[test]
    fn price_band_is_inclusive_thirty_percent() {
        let band = PriceBand::around(Price::from_cents(10_000), PriceBand::RELATED_PERCENT);
        assert_eq!(band.lower(), Price::from_cents(7_000));
        assert_eq!(band.upper(), Price::from_cents(13_000));
        assert!(band.contains(Price::from_cents(7_000)));
        assert!(band.contains(Price::from_cents(13_000)));
        assert!(!band.contains(Price::from_cents(6_999)));
        assert!(!band.contains(Price::from_cents(13_001)));
    }

    #[test]
    fn price_band_rounds_inward_on_odd_cents() {
        // 99.99 spans [69.993, 129.987]
        let band = PriceBand::around(Price::from_cents(9_999), 30);
        assert_eq!(band.lower(), Price::from_cents(7_000));
        assert_eq!(band.upper(), Price::from_cents(12_998));
    }

    fn related_fixture() -> (ProductRecord, PriceBand) {
        let phones = Category::new(CategoryId::new(1), "Phones", "phones");
        let acme = Brand::new(BrandId::new(1), "Acme");
        let source = rec(100, "Source", 10_000).with_category(&phones).with_brand(&acme);
        let band = PriceBand::around(source.price, PriceBand::RELATED_PERCENT);
        (source, band)
    }

    #[test]
    fn affinity_tiers_rank_category_and_brand_first() {
        let (source, band) = related_fixture();
        let phones = Category::new(CategoryId::new(1), "Phones", "phones");
        let laptops = Category::new(CategoryId::new(2), "Laptops", "laptops");
        let acme = Brand::new(BrandId::new(1), "Acme");
        let zeta = Brand::new(BrandId::new(2), "Zeta");

        let both = rec(1, "both", 90_000).with_category(&phones).with_brand(&acme);
        let cat_only = rec(2, "cat", 90_000).with_category(&phones).with_brand(&zeta);
        let brand_only = rec(3, "brand", 90_000).with_category(&laptops).with_brand(&acme);
        let band_only = rec(4, "band", 12_000).with_category(&laptops).with_brand(&zeta);
        let unrelated = rec(5, "far", 50_000).with_category(&laptops).with_brand(&zeta);

        let ranked = rank_by_affinity(
            &source,
            &band,
            vec![unrelated, band_only, brand_only, cat_only, both, source.clone()],
            10,
        );
        assert_eq!(ids(&ranked), vec![1, 2, 3, 4]);
    }

    #[test]
    fn category_membership_admits_rows_outside_the_band() {
        let (source, band) = related_fixture();
        let phones = Category::new(CategoryId::new(1), "Phones", "phones");
        let pricey = rec(7, "pricey", 1_000_000).with_category(&phones);

        assert_eq!(AffinityTier::classify(&source, &band, &pricey), Some(AffinityTier::CategoryOnly));
    }

    #[test]
    fn missing_source_references_never_match_missing_candidate_references() {
        let source = rec(1, "loose", 10_000);
        let band = PriceBand::around(source.price, 30);
        let far = rec(2, "far loose", 90_000);
        assert_eq!(AffinityTier::classify(&source, &band, &far), None);
    }

    #[test]
    fn affinity_secondary_is_featured_then_price_distance() {
        let (source, band) = related_fixture();
        let phones = Category::new(CategoryId::new(1), "Phones", "phones");
        let near = rec(1, "near", 10_100).with_category(&phones);
        let far = rec(2, "far", 20_000).with_category(&phones);
        let mut featured_far = rec(3, "featured far", 50_000).with_category(&phones);
        featured_far.featured = true;

        let ranked = rank_by_affinity(&source, &band, vec![far, near, featured_far], 10);
        assert_eq!(ids(&ranked), vec![3, 1, 2]);
    }

    #[test]
    fn affinity_truncates_to_limit() {
        let (source, band) = related_fixture();
        let phones = Category::new(CategoryId::new(1), "Phones", "phones");
        let rows: Vec<_> = (1..=10).map(|i| rec(i, "x", 10_000).with_category(&phones)).collect();
        assert_eq!(rank_by_affinity(&source, &band, rows, 6).len(), 6);
    }

    #[test]
    fn rank_key_orders_then_caps() {
        let rows: Vec<ProductRecord> = (1..=30).map(|i| rec(i, &format!("Cable {i}"), 100)).collect();

        let relevance = RankKey::relevance(" cable 1 ", RelevanceSecondary::NameAsc);
        let ranked = relevance.rank(rows.clone(), 3);
        assert_eq!(ids(&ranked), vec![1, 10, 11]);

        let phones = Category::new(CategoryId::new(1), "Phones", "phones");
        let source = rec(5, "Source", 100).with_category(&phones);
        let related: Vec<ProductRecord> = rows.into_iter().map(|r| r.with_category(&phones)).collect();
        let affinity = RankKey::affinity(&source, PriceBand::around(source.price, 30));
        let ranked = affinity.rank(related, 4);
        assert_eq!(ids(&ranked), vec![1, 2, 3, 4]);
    }

    proptest! {
        /// Property: every sort mode yields the same order regardless of input order.
        #[test]
        fn sort_modes_are_input_order_independent(
            prices in prop::collection::vec(0u64..5_000, 1..30),
            seed in any::<u64>(),
        ) {
            let rows: Vec<ProductRecord> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let mut r = rec(i as i64 + 1, "p", *p);
                    r.featured = (p + seed) % 3 == 0;
                    r.rating = ((p + seed) % 50) as f64 / 10.0;
                    r
                })
                .collect();

            for mode in [SortMode::Featured, SortMode::PriceLow, SortMode::PriceHigh, SortMode::Rating, SortMode::Newest] {
                let mut forward = rows.clone();
                let mut reversed: Vec<_> = rows.iter().rev().cloned().collect();
                mode.sort(&mut forward);
                mode.sort(&mut reversed);
                prop_assert_eq!(ids(&forward), ids(&reversed));
            }
        }

        /// Property: band membership agrees with the exact ±30% rational bounds.
        #[test]
        fn band_matches_rational_definition(center in 0u64..10_000_000, price in 0u64..20_000_000) {
            let band = PriceBand::around(Price::from_cents(center), 30);
            let expected = price as u128 * 100 >= center as u128 * 70
                && price as u128 * 100 <= center as u128 * 130;
            prop_assert_eq!(band.contains(Price::from_cents(price)), expected);
        }
    }
}
