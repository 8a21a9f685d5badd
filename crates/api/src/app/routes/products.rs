use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::get,
};

use shopfront_infra::{RelatedOutcome, SuggestOutcome};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_products))
        .route("/suggest", get(suggest_products))
        .route("/:id", get(get_product))
        .route("/:id/related", get(related_products))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    let criteria = query.to_criteria(services.engine.config().page_defaults);
    match services.engine.list(&criteria).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::discovery_error_to_response(e, services.debug),
    }
}

pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let term = query.q.unwrap_or_default();
    match services.engine.search(&term).await {
        Ok(hits) => Json::<dto::SearchResponse>(hits).into_response(),
        Err(e) => errors::discovery_error_to_response(e, services.debug),
    }
}

pub async fn suggest_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SuggestQuery>,
) -> axum::response::Response {
    let term = query.q.unwrap_or_default();
    let limit = dto::parse_limit(query.limit.as_deref());

    let suggestions = match services.engine.suggest(&term, limit).await {
        Ok(SuggestOutcome::Suggestions(hits)) => hits,
        Ok(SuggestOutcome::EmptyQuery) => {
            return Json(dto::SuggestResponse {
                success: false,
                suggestions: Vec::new(),
                count: 0,
            })
            .into_response();
        }
        Err(e) => return errors::discovery_error_to_response(e, services.debug),
    };

    Json(dto::SuggestResponse {
        success: true,
        count: suggestions.len(),
        suggestions,
    })
    .into_response()
}

pub async fn related_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::RelatedQuery>,
) -> axum::response::Response {
    let limit = dto::parse_limit(query.limit.as_deref());

    let body = match services.engine.related(dto::parse_path_id(&id), limit).await {
        Ok(RelatedOutcome::Related { products, .. }) => dto::RelatedResponse::found(products),
        Ok(RelatedOutcome::InvalidId) => dto::RelatedResponse::failed("Invalid product ID"),
        Ok(RelatedOutcome::NotFound) => dto::RelatedResponse::failed("Product not found"),
        Err(e) => return errors::discovery_error_to_response(e, services.debug),
    };

    Json(body).into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let body = match services.engine.product(dto::parse_path_id(&id)).await {
        Ok(Some(product)) => dto::ProductDetailResponse {
            success: true,
            product: Some(product),
            message: None,
        },
        Ok(None) => dto::ProductDetailResponse {
            success: false,
            product: None,
            message: Some("Product not found".to_string()),
        },
        Err(e) => return errors::discovery_error_to_response(e, services.debug),
    };

    Json(body).into_response()
}
