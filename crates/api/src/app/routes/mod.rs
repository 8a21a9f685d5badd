use axum::{Router, routing::get};

pub mod catalog;
pub mod products;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .route("/brands", get(catalog::list_brands))
        .route("/categories", get(catalog::list_categories))
}
