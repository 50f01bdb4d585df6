//! Affiliate product-query API client.
//!
//! Issues signed queries against the affiliate product-search API and
//! normalizes the response.
//!
//! ### Specification
//!
//! - **Endpoint**: configured base URL (e.g. `https://api-sg.aliexpress.com/sync`)
//! - **Authentication**: MD5 signature over sorted parameters wrapped with
//!   the app secret, sent as the `sign` query parameter.
//! - **Transport**: one plain GET per query; no retry, no backoff.
//! - **Normalization**: flattens the nested envelope into `Product` DTOs.

pub mod error;
pub mod request;
pub mod response;
pub mod sign;

pub use error::AffiliateError;
pub use request::ProductQuery;
pub use response::{Product, RawProduct, normalize_products};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Default base URL for the affiliate sync endpoint.
const DEFAULT_BASE_URL: &str = "https://api-sg.aliexpress.com/sync";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "shopgate/0.1";

/// Upstream method name for product queries.
const QUERY_METHOD: &str = "aliexpress.affiliate.product.query";

/// Affiliate API client configuration.
#[derive(Debug, Clone)]
pub struct AffiliateConfig {
    /// Application key.
    pub app_key: String,
    /// Application secret used for signing.
    pub app_secret: String,
    /// Base URL of the sync endpoint.
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for AffiliateConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Affiliate product-query client.
#[derive(Debug, Clone)]
pub struct AffiliateClient {
    http: reqwest::Client,
    config: AffiliateConfig,
}

impl AffiliateClient {
    /// Create a new client with the given configuration.
    pub fn new(config: AffiliateConfig) -> Result<Self, AffiliateError> {
        if config.app_key.is_empty() || config.app_secret.is_empty() || config.base_url.is_empty() {
            return Err(AffiliateError::MissingCredentials);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| AffiliateError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Execute a product query and return the normalized product list.
    pub async fn query_products(&self, query: &ProductQuery) -> Result<Vec<Product>, AffiliateError> {
        query.validate()?;
        let body = self.call(QUERY_METHOD, &query.business_params()).await?;
        Ok(normalize_products(&body))
    }

    /// Issue one signed call and return the parsed body.
    ///
    /// Known upstream error conditions are translated; everything else in
    /// `error_response` is rethrown verbatim as `code: msg`.
    async fn call(&self, method: &str, biz_params: &[(String, String)]) -> Result<Value, AffiliateError> {
        let mut params = self.protocol_params(method, Utc::now());
        params.extend_from_slice(biz_params);

        let signature = sign::sign(&params, &self.config.app_secret);
        params.push(("sign".to_string(), signature));

        tracing::debug!("calling affiliate API: method={}", method);

        let http_response = self
            .http
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await
            .map_err(
                |e| {
                    if e.is_timeout() { AffiliateError::Timeout } else { AffiliateError::Network(Arc::new(e)) }
                },
            )?;

        let status = http_response.status();
        tracing::debug!("affiliate API response status: {}", status);

        let text = http_response
            .text()
            .await
            .map_err(|e| AffiliateError::Network(Arc::new(e)))?;

        if !status.is_success() {
            return Err(AffiliateError::Http { status: status.as_u16(), body: text });
        }

        let body: Value = serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "raw": text }));

        if let Some(err) = body.get("error_response") {
            return Err(translate_error_response(err));
        }

        Ok(body)
    }

    /// Fixed protocol parameters merged into every call.
    fn protocol_params(&self, method: &str, now: DateTime<Utc>) -> Vec<(String, String)> {
        vec![
            ("app_key".to_string(), self.config.app_key.clone()),
            ("method".to_string(), method.to_string()),
            ("format".to_string(), "json".to_string()),
            ("v".to_string(), "2.0".to_string()),
            ("sign_method".to_string(), "md5".to_string()),
            ("timestamp".to_string(), api_timestamp(now)),
        ]
    }
}

/// Timestamp in the wire format the API expects: `YYYY-MM-DD HH:MM:SS.mmm` UTC.
fn api_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Translate an upstream `error_response` payload.
///
/// Two conditions get clearer messages (invalid credentials, rate limiting);
/// anything else passes through as `code: msg`.
fn translate_error_response(err: &Value) -> AffiliateError {
    let code = err
        .get("code")
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "ALI_ERROR".to_string());
    let msg = err.get("msg").and_then(Value::as_str).unwrap_or("Unknown error");

    let full = format!("{code}: {msg}");
    let lower = full.to_lowercase();

    if lower.contains("invalid app") {
        return AffiliateError::InvalidCredentials;
    }
    if lower.contains("frequency") || lower.contains("throttle") || lower.contains("too many") {
        return AffiliateError::RateLimited;
    }
    AffiliateError::Upstream(full)
}
