use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn list_brands(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.engine.brands().await {
        Ok(brands) => Json(brands).into_response(),
        Err(e) => errors::discovery_error_to_response(e, services.debug),
    }
}

pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.engine.categories().await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => errors::discovery_error_to_response(e, services.debug),
    }
}
