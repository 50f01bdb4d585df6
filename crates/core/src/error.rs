//! Unified error types for shopgate.
//!
//! Every failure the server can surface flows through this enum so the
//! HTTP layer has a single place to map errors onto status codes.

use tokio_rusqlite::rusqlite;

use crate::config::ConfigError;

/// Unified error types for the shopgate server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., missing category_id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No category row exists for the given id.
    #[error("CATEGORY_NOT_FOUND: {0}")]
    CategoryNotFound(String),

    /// The category exists but carries no usable keyword data.
    #[error("EMPTY_KEYWORDS: ali_keywords is empty for category {0}")]
    EmptyKeywords(String),

    /// Required deployment configuration is absent.
    #[error("MISSING_CONFIG: {field} ({hint})")]
    MissingConfig { field: String, hint: String },

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Resource manifest could not be read or parsed.
    #[error("MANIFEST_ERROR: {0}")]
    Manifest(String),

    /// No cached copy exists for a path that required one.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Upstream returned a non-success HTTP status.
    #[error("UPSTREAM_HTTP: status {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// Upstream error payload passed through verbatim.
    #[error("UPSTREAM_ERROR: {0}")]
    Upstream(String),

    /// Affiliate credentials rejected by the upstream API.
    #[error("AFFILIATE_AUTH: {0}")]
    AffiliateAuth(String),

    /// Affiliate API rate limit exceeded.
    #[error("AFFILIATE_RATE_LIMITED: {0}")]
    AffiliateRateLimited(String),

    /// Transport-level failure talking to an upstream host.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { field, hint } => Error::MissingConfig { field, hint },
            other => Error::InvalidInput(other.to_string()),
        }
    }
}
