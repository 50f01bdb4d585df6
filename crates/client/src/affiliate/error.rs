//! Affiliate API client error types.

use std::sync::Arc;

/// Errors from the affiliate product-query client.
#[derive(Debug, thiserror::Error)]
pub enum AffiliateError {
    /// App key, secret, or base URL absent from configuration.
    #[error("missing affiliate credentials: app_key / app_secret / base_url not set")]
    MissingCredentials,

    /// Invalid query parameters.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Upstream rejected the app key or signature.
    #[error("invalid app key or app secret")]
    InvalidCredentials,

    /// Rate limited by the affiliate API.
    #[error("affiliate API rate limit exceeded")]
    RateLimited,

    /// Upstream error payload passed through verbatim as `code: msg`.
    #[error("{0}")]
    Upstream(String),

    /// Non-success HTTP status from the affiliate endpoint.
    #[error("affiliate HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for AffiliateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { AffiliateError::Timeout } else { AffiliateError::Network(Arc::new(err)) }
    }
}
