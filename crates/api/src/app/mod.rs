//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the shared discovery engine
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: query parameters and response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::http::{HeaderValue, header};
use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use shopfront_infra::CatalogStore;

use crate::config::ApiConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router_with(Arc::new(services)))
}

/// Build the router over an already-constructed store.
pub fn build_app_with_store(store: Arc<dyn CatalogStore>, config: &ApiConfig) -> Router {
    router_with(Arc::new(AppServices::new(store, config)))
}

fn router_with(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ))
                .layer(Extension(services)),
        )
}
