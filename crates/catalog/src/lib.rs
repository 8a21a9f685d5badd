//! Catalog discovery domain (filtering, ranking, pagination, formatting).
//!
//! Everything here is deterministic domain logic over rows already read from
//! the catalog store: no IO, no HTTP, no storage.

pub mod criteria;
pub mod filter;
pub mod format;
pub mod pagination;
pub mod product;
pub mod ranking;

pub use criteria::SearchCriteria;
pub use filter::{Clause, Predicate, PredicateBuilder, RelatedAffinity, TextField};
pub use format::{FormatOptions, ProductView, ResultFormatter, SearchHit, SuggestionHit};
pub use pagination::{PageDefaults, PageMeta, PageRequest};
pub use product::{Availability, Brand, Category, ProductRecord};
pub use ranking::{
    AffinityTier, PriceBand, RankKey, RelevanceSecondary, RelevanceTier, SortMode,
    rank_by_affinity, rank_by_relevance,
};
