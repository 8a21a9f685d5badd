//! Infrastructure layer: catalog store adapters and the discovery engine.

pub mod catalog_store;
pub mod discovery;

pub use catalog_store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, StoreError};
pub use discovery::{
    DiscoveryConfig, DiscoveryEngine, DiscoveryError, ListingPage, RelatedOutcome, SuggestOutcome,
};
