//! Route table.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{assets, control, products};
use crate::state::AppState;

/// Build the application router.
///
/// Any path outside the explicit routes falls through to the asset layer,
/// which decides from the manifest whether to intercept.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/v1/products", post(products::products))
        .route("/v1/sync", post(control::control))
        .fallback(assets::serve_asset)
        .method_not_allowed_fallback(|| async { crate::error::method_not_allowed() })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
