//! Shell-resource fetch client.
//!
//! Fetches built web-app files from the shell origin. Install-time fetches
//! use `Reload` mode, which sends no-cache headers so intermediaries cannot
//! serve stale shell files. HTTP status is captured on the response rather
//! than raised as an error; only transport failures error out, which lets
//! the asset layer fall back to cache on network failure alone.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, header};
use url::Url;

use shopgate_core::Error;

/// Configuration for the shell fetch client.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Origin the built shell is served from.
    pub origin: String,

    /// User agent string.
    pub user_agent: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8080".to_string(),
            user_agent: "shopgate/0.1".to_string(),
            timeout: Duration::from_millis(20_000),
        }
    }
}

/// Cache behavior for a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Normal request.
    Default,
    /// Bypass any intermediary cache (install-time shell downloads).
    Reload,
}

/// Response from a shell fetch.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    /// Logical path that was requested.
    pub path: String,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header.
    pub content_type: Option<String>,
    /// Response body bytes.
    pub bytes: Bytes,
}

impl FetchedAsset {
    /// Whether the upstream answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert to a store entry stamped with the current time.
    pub fn to_cached(&self) -> shopgate_core::CachedAsset {
        shopgate_core::CachedAsset {
            path: self.path.clone(),
            status: self.status,
            content_type: self.content_type.clone(),
            body: self.bytes.to_vec(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// HTTP client for shell resources.
#[derive(Debug, Clone)]
pub struct ShellClient {
    http: Client,
    base: Url,
}

impl ShellClient {
    /// Create a new shell client for the configured origin.
    pub fn new(config: ShellConfig) -> Result<Self, Error> {
        let mut origin = config.origin.clone();
        if !origin.ends_with('/') {
            origin.push('/');
        }
        let base = Url::parse(&origin).map_err(|e| Error::InvalidInput(format!("invalid shell origin: {e}")))?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base })
    }

    /// Fetch a logical path from the shell origin.
    ///
    /// The root document key `"/"` resolves to the origin itself. Non-2xx
    /// responses are returned, not raised; only transport failures are
    /// errors.
    pub async fn fetch(&self, key: &str, mode: CacheMode) -> Result<FetchedAsset, Error> {
        let url = if key == "/" {
            self.base.clone()
        } else {
            self.base
                .join(key)
                .map_err(|e| Error::InvalidInput(format!("invalid resource path {key}: {e}")))?
        };

        let mut request = self.http.get(url.clone());
        if mode == CacheMode::Reload {
            request = request
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("fetch {key} failed: {e}")))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read {key}: {e}")))?;

        tracing::debug!("fetched {} -> {} ({} bytes)", key, status, bytes.len());

        Ok(FetchedAsset { path: key.to_string(), status, content_type, bytes })
    }
}
