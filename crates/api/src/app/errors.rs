use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shopfront_infra::DiscoveryError;

const GENERIC_STORE_MESSAGE: &str = "The catalog is temporarily unavailable. Please try again.";

/// Map an engine failure to a 500. Details are logged, and echoed only when `debug` is on.
pub fn discovery_error_to_response(err: DiscoveryError, debug: bool) -> axum::response::Response {
    match err {
        DiscoveryError::Store(e) => {
            tracing::error!(error = %e, "catalog store failure");
            let message = if debug {
                e.to_string()
            } else {
                GENERIC_STORE_MESSAGE.to_string()
            };
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
