//! Manifest-driven asset interception.
//!
//! Every GET whose normalized key appears in the manifest is served through
//! the cache: cache-first for fingerprinted resources, network-first for
//! the root document so a fresh deployment shows up on the next load while
//! an outage falls back to the cached copy. Paths outside the manifest get
//! a plain 404; the gateway is not a general-purpose proxy.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use shopgate_client::{CacheMode, FetchedAsset};
use shopgate_core::manifest::request_key;
use shopgate_core::store::{CONTENT_CACHE, CachedAsset};
use shopgate_core::Error;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn serve_asset(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return crate::error::method_not_allowed();
    }

    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path());
    let key = request_key(path_and_query);

    if !state.manifest.contains(&key) {
        return ApiError(Error::CacheMiss(format!("{key} is not a managed resource"))).into_response();
    }

    let result = if key == "/" {
        network_first(&state, &key).await
    } else {
        cache_first(&state, &key).await
    };

    match result {
        Ok(response) => response,
        Err(err) => ApiError(err).into_response(),
    }
}

/// Serve from the content cache, fetching on a miss.
///
/// Only 2xx fetches are cached; an upstream failure response passes through
/// uncached so a later request can retry.
async fn cache_first(state: &AppState, key: &str) -> Result<Response, Error> {
    if let Some(asset) = state.db.get_asset(CONTENT_CACHE, key).await? {
        tracing::debug!("cache hit for {}", key);
        return Ok(cached_response(&asset));
    }

    tracing::debug!("cache miss for {}, fetching", key);
    let fetched = state.shell.fetch(key, CacheMode::Default).await?;
    if fetched.is_success() {
        state.db.put_asset(CONTENT_CACHE, &fetched.to_cached()).await?;
    }
    Ok(fetched_response(&fetched))
}

/// Fetch from the origin, falling back to cache only on transport failure.
///
/// The fresh copy is cached whatever its status, so the root document
/// always reflects the last thing the origin actually served.
async fn network_first(state: &AppState, key: &str) -> Result<Response, Error> {
    match state.shell.fetch(key, CacheMode::Default).await {
        Ok(fetched) => {
            state.db.put_asset(CONTENT_CACHE, &fetched.to_cached()).await?;
            Ok(fetched_response(&fetched))
        }
        Err(err @ Error::Network(_)) => {
            tracing::warn!("root fetch failed, trying cache: {err}");
            match state.db.get_asset(CONTENT_CACHE, key).await? {
                Some(asset) => Ok(cached_response(&asset)),
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

fn build_response(status: u16, content_type: Option<&str>, body: Vec<u8>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    match content_type.and_then(|ct| HeaderValue::from_str(ct).ok()) {
        Some(ct) => (status, [(header::CONTENT_TYPE, ct)], body).into_response(),
        None => (status, body).into_response(),
    }
}

fn cached_response(asset: &CachedAsset) -> Response {
    build_response(asset.status, asset.content_type.as_deref(), asset.body.clone())
}

fn fetched_response(fetched: &FetchedAsset) -> Response {
    build_response(fetched.status, fetched.content_type.as_deref(), fetched.bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use shopgate_core::{AppConfig, ResourceManifest, StoreDb};

    use super::*;

    fn manifest(entries: &[(&str, &str)]) -> ResourceManifest {
        ResourceManifest {
            resources: entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            shell: Vec::new(),
        }
    }

    // Unreachable origin: cache hits must be served without any fetch.
    async fn test_state(manifest: ResourceManifest) -> Arc<AppState> {
        let config = AppConfig {
            shell_origin: "http://127.0.0.1:9".into(),
            timeout_ms: 2_000,
            ..Default::default()
        };
        let db = StoreDb::open_in_memory().await.unwrap();
        Arc::new(AppState::new_with_manifest(config, db, manifest).unwrap())
    }

    fn asset(path: &str, body: &[u8]) -> CachedAsset {
        CachedAsset {
            path: path.to_string(),
            status: 200,
            content_type: Some("text/html".to_string()),
            body: body.to_vec(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    async fn body_of(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn test_unmanaged_path_is_not_found() {
        let state = test_state(manifest(&[("main.js", "v1")])).await;
        let response =
            serve_asset(State(state), Method::GET, Uri::from_static("/unknown.js")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_get_is_rejected_with_error_body() {
        let state = test_state(manifest(&[("main.js", "v1")])).await;
        let response = serve_asset(State(state), Method::POST, Uri::from_static("/main.js")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let json: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(json["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let state = test_state(manifest(&[("main.js", "v1")])).await;
        state.db.put_asset(CONTENT_CACHE, &asset("main.js", b"cached body")).await.unwrap();

        let response = serve_asset(
            State(Arc::clone(&state)),
            Method::GET,
            Uri::from_static("/main.js?v=12345"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
        assert_eq!(body_of(response).await, b"cached body");
    }

    #[tokio::test]
    async fn test_cache_miss_with_dead_origin_is_bad_gateway() {
        let state = test_state(manifest(&[("main.js", "v1")])).await;
        let response = serve_asset(State(state), Method::GET, Uri::from_static("/main.js")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_root_falls_back_to_cache_when_origin_down() {
        let state = test_state(manifest(&[("/", "v1")])).await;
        state.db.put_asset(CONTENT_CACHE, &asset("/", b"<html>cached</html>")).await.unwrap();

        let response = serve_asset(State(state), Method::GET, Uri::from_static("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, b"<html>cached</html>");
    }

    #[tokio::test]
    async fn test_root_without_cache_propagates_network_error() {
        let state = test_state(manifest(&[("/", "v1")])).await;
        let response = serve_asset(State(state), Method::GET, Uri::from_static("/")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_cached_error_status_replays() {
        let state = test_state(manifest(&[("missing.js", "v1")])).await;
        let mut stored = asset("missing.js", b"not found");
        stored.status = 404;
        state.db.put_asset(CONTENT_CACHE, &stored).await.unwrap();

        let response =
            serve_asset(State(state), Method::GET, Uri::from_static("/missing.js")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, b"not found");
    }
}
