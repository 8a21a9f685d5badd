use std::sync::Arc;

use anyhow::Context;

use shopfront_infra::{CatalogStore, DiscoveryEngine, InMemoryCatalogStore, PostgresCatalogStore};

use crate::config::ApiConfig;

const PG_MAX_CONNECTIONS: u32 = 10;

/// Shared handler state.
pub struct AppServices {
    pub engine: DiscoveryEngine<Arc<dyn CatalogStore>>,
    /// Echo store error details in 500 responses.
    pub debug: bool,
}

impl AppServices {
    pub fn new(store: Arc<dyn CatalogStore>, config: &ApiConfig) -> Self {
        Self {
            engine: DiscoveryEngine::new(store, config.discovery()),
            debug: config.debug,
        }
    }
}

/// Pick the catalog store from configuration.
///
/// Postgres when `USE_PERSISTENT_STORES` is on and `DATABASE_URL` is set;
/// otherwise an empty in-memory catalog.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn CatalogStore> = match (&config.database_url, config.use_persistent_stores) {
        (Some(url), true) => {
            let pg = PostgresCatalogStore::connect(url, PG_MAX_CONNECTIONS)
                .await
                .context("failed to connect to catalog database")?;
            tracing::info!("using postgres catalog store");
            Arc::new(pg)
        }
        (None, true) => {
            tracing::warn!("USE_PERSISTENT_STORES set without DATABASE_URL; using in-memory catalog");
            Arc::new(InMemoryCatalogStore::new())
        }
        _ => {
            tracing::info!("using in-memory catalog store");
            Arc::new(InMemoryCatalogStore::new())
        }
    };

    Ok(AppServices::new(store, config))
}
