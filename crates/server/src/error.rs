//! HTTP error mapping.
//!
//! Every error is serialized as `{"error": message}` with a status
//! reflecting the failure class: 400 missing input, 404 not found, 502
//! unreachable upstream, 500 misconfiguration or upstream failure.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use shopgate_core::Error;

/// Wrapper turning core errors into JSON error responses.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl<E: Into<Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

/// Fixed 405 response, serialized like every other error.
pub fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "error": "Method Not Allowed" }))).into_response()
}

/// Status code for each failure class.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) | Error::EmptyKeywords(_) => StatusCode::BAD_REQUEST,
        Error::CategoryNotFound(_) | Error::CacheMiss(_) => StatusCode::NOT_FOUND,
        Error::Network(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = self.0.to_string();

        if status.is_server_error() {
            tracing::error!("request failed ({status}): {message}");
        } else {
            tracing::warn!("request rejected ({status}): {message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
