//! Category product-query endpoint.
//!
//! Resolves a category id to its stored affiliate keywords, then issues one
//! signed query against the affiliate API and returns the normalized
//! product list. All validation happens before any network traffic.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shopgate_client::{AffiliateClient, AffiliateConfig, AffiliateError, Product, ProductQuery};
use shopgate_core::{AppConfig, Error, StoreDb};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for the products endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductsRequest {
    /// Category identifier; string and numeric forms are both accepted.
    #[serde(default)]
    pub category_id: Option<Value>,

    /// 1-based result page (default 1).
    #[serde(default)]
    pub page_no: Option<u32>,

    /// Results per page (default from configuration).
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Response body for the products endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProductsResponse {
    pub category_id: String,
    pub keywords_used: String,
    pub count: usize,
    pub products: Vec<Product>,
}

pub async fn products(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ProductsResponse>, ApiError> {
    // A malformed body is treated as an empty one; the missing category_id
    // then produces the 400.
    let request: ProductsRequest = serde_json::from_slice(&body).unwrap_or_default();
    let response = query_category_products(&state.db, &state.config, request).await?;
    Ok(Json(response))
}

/// Run the category lookup and affiliate query.
///
/// Check order matters: category lookup and keyword extraction run before
/// the credential check, so an unknown category reports 404 even on an
/// unconfigured deployment.
pub async fn query_category_products(
    db: &StoreDb,
    config: &AppConfig,
    request: ProductsRequest,
) -> Result<ProductsResponse, Error> {
    let category_id = match request.category_id {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(Error::InvalidInput("category_id is required".into())),
    };

    let category = db
        .get_category(&category_id)
        .await?
        .ok_or_else(|| Error::CategoryNotFound(category_id.clone()))?;

    let keywords = keywords_from_field(category.ali_keywords.as_deref())
        .ok_or_else(|| Error::EmptyKeywords(category_id.clone()))?;

    let creds = config.require_app_credentials()?;
    let tracking_id = config.require_tracking_id()?;

    tracing::info!("querying products: category={category_id} keywords={keywords:?}");

    let query = ProductQuery {
        keywords: keywords.clone(),
        page_no: request.page_no.unwrap_or(1),
        page_size: request.page_size.unwrap_or(config.default_page_size),
        target_language: config.target_language.clone(),
        target_currency: config.target_currency.clone(),
        tracking_id: tracking_id.to_string(),
    };

    let client = AffiliateClient::new(AffiliateConfig {
        app_key: creds.app_key.to_string(),
        app_secret: creds.app_secret.to_string(),
        base_url: creds.base_url.to_string(),
        timeout: config.timeout(),
        user_agent: config.user_agent.clone(),
    })
    .map_err(affiliate_error)?;

    let products = client.query_products(&query).await.map_err(affiliate_error)?;

    Ok(ProductsResponse { category_id, keywords_used: keywords, count: products.len(), products })
}

fn affiliate_error(err: AffiliateError) -> Error {
    match err {
        AffiliateError::MissingCredentials => Error::MissingConfig {
            field: "ali_app_key / ali_app_secret / ali_base_url".into(),
            hint: "Set SHOPGATE_ALI_APP_KEY, SHOPGATE_ALI_APP_SECRET, SHOPGATE_ALI_BASE_URL".into(),
        },
        AffiliateError::InvalidQuery(msg) => Error::InvalidInput(msg),
        AffiliateError::InvalidCredentials => Error::AffiliateAuth("invalid app key or app secret".into()),
        AffiliateError::RateLimited => Error::AffiliateRateLimited("affiliate API rate limit exceeded".into()),
        AffiliateError::Upstream(msg) => Error::Upstream(msg),
        AffiliateError::Http { status, body } => Error::UpstreamHttp { status, body },
        // Transport failures on this path stay 500-class; only the asset
        // gateway reports 502 for an unreachable origin.
        AffiliateError::Timeout => Error::Upstream("affiliate API request timed out".into()),
        AffiliateError::Network(e) => Error::Upstream(format!("affiliate API unreachable: {e}")),
    }
}

/// Interpret the raw keyword column.
///
/// The column holds either a JSON string, a JSON list of strings whose
/// non-empty trimmed entries are joined with single spaces, or plain text.
/// Returns None when nothing usable remains.
fn keywords_from_field(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(s)) => non_empty(s.trim()),
        Ok(Value::Array(items)) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            non_empty(&joined)
        }
        // Any other JSON type carries no keyword text.
        Ok(_) => None,
        // Not JSON at all: treat the column as plain text.
        Err(_) => non_empty(raw.trim()),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}
