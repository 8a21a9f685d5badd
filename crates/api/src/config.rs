//! Process configuration read from the environment at startup.

use std::net::SocketAddr;
use std::str::FromStr;

use shopfront_catalog::{FormatOptions, PageDefaults};
use shopfront_infra::DiscoveryConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; without it the in-memory store is used.
    pub database_url: Option<String>,
    pub use_persistent_stores: bool,
    pub page_defaults: PageDefaults,
    pub placeholder_image: String,
    /// Echo store error details in 500 responses.
    pub debug: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            use_persistent_stores: false,
            page_defaults: PageDefaults::default(),
            placeholder_image: FormatOptions::default().placeholder_image,
            debug: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Malformed values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let use_persistent_stores = lookup("USE_PERSISTENT_STORES")
            .map(|v| parse_flag("USE_PERSISTENT_STORES", &v))
            .unwrap_or(database_url.is_some());

        let default_limit = parsed(&lookup, "DEFAULT_PAGE_SIZE", defaults.page_defaults.default_limit)
            .max(1);
        let max_limit = parsed(&lookup, "MAX_PAGE_SIZE", defaults.page_defaults.max_limit).max(default_limit);

        Self {
            bind_addr: parsed(&lookup, "BIND_ADDR", defaults.bind_addr),
            database_url,
            use_persistent_stores,
            page_defaults: PageDefaults {
                default_limit,
                max_limit,
            },
            placeholder_image: lookup("PLACEHOLDER_IMAGE")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.placeholder_image),
            debug: lookup("APP_DEBUG")
                .map(|v| parse_flag("APP_DEBUG", &v))
                .unwrap_or(false),
        }
    }

    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            page_defaults: self.page_defaults,
            format: FormatOptions {
                placeholder_image: self.placeholder_image.clone(),
                ..FormatOptions::default()
            },
            ..DiscoveryConfig::default()
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "malformed configuration value; using default");
                default
            }
        },
    }
}

fn parse_flag(key: &str, raw: &str) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" | "" => false,
        _ => {
            tracing::warn!(key, value = %raw, "malformed boolean flag; treating as false");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ApiConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(config(&[]), ApiConfig::default());
    }

    #[test]
    fn database_url_implies_persistence_unless_disabled() {
        let c = config(&[("DATABASE_URL", "postgres://localhost/shop")]);
        assert!(c.use_persistent_stores);

        let c = config(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("USE_PERSISTENT_STORES", "false"),
        ]);
        assert!(!c.use_persistent_stores);
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let c = config(&[
            ("DEFAULT_PAGE_SIZE", "twelve"),
            ("MAX_PAGE_SIZE", "50"),
            ("BIND_ADDR", "nowhere"),
        ]);
        assert_eq!(c.page_defaults.default_limit, 12);
        assert_eq!(c.page_defaults.max_limit, 50);
        assert_eq!(c.bind_addr, ApiConfig::default().bind_addr);
    }

    #[test]
    fn max_page_size_never_below_default() {
        let c = config(&[("DEFAULT_PAGE_SIZE", "30"), ("MAX_PAGE_SIZE", "10")]);
        assert_eq!(c.page_defaults.default_limit, 30);
        assert_eq!(c.page_defaults.max_limit, 30);
    }

    #[test]
    fn discovery_config_carries_overrides() {
        let c = config(&[("PLACEHOLDER_IMAGE", "/img/none.png"), ("APP_DEBUG", "1")]);
        assert!(c.debug);
        let d = c.discovery();
        assert_eq!(d.format.placeholder_image, "/img/none.png");
        assert_eq!(d.format.product_url_prefix, "/product/");
        assert_eq!(d.search_cap, 10);
    }
}
