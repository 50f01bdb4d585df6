//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHOPGATE_*)
//! 2. TOML config file (if SHOPGATE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Affiliate API credentials resolved from configuration.
#[derive(Debug, Clone)]
pub struct AffiliateCredentials<'a> {
    pub app_key: &'a str,
    pub app_secret: &'a str,
    pub base_url: &'a str,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHOPGATE_*)
/// 2. TOML config file (if SHOPGATE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path to the SQLite store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the built web-app shell is fetched from.
    #[serde(default = "default_shell_origin")]
    pub shell_origin: String,

    /// Path to the build-produced resource manifest JSON.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// User-Agent string for outbound HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Outbound HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Affiliate application key.
    ///
    /// Set via SHOPGATE_ALI_APP_KEY. Required only when the products
    /// endpoint is called.
    #[serde(default)]
    pub ali_app_key: Option<String>,

    /// Affiliate application secret used for request signing.
    ///
    /// Set via SHOPGATE_ALI_APP_SECRET.
    #[serde(default)]
    pub ali_app_secret: Option<String>,

    /// Affiliate API base URL (e.g. https://api-sg.aliexpress.com/sync).
    ///
    /// Set via SHOPGATE_ALI_BASE_URL.
    #[serde(default)]
    pub ali_base_url: Option<String>,

    /// Affiliate tracking id attached to every product query.
    ///
    /// Set via SHOPGATE_ALI_TRACKING_ID.
    #[serde(default)]
    pub ali_tracking_id: Option<String>,

    /// Target language for product results.
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Target currency for product results.
    #[serde(default = "default_target_currency")]
    pub target_currency: String,

    /// Page size used when the request omits one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shopgate.sqlite")
}

fn default_shell_origin() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("./resources.json")
}

fn default_user_agent() -> String {
    "shopgate/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_target_language() -> String {
    "ar".into()
}

fn default_target_currency() -> String {
    "SAR".into()
}

fn default_page_size() -> u32 {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            shell_origin: default_shell_origin(),
            manifest_path: default_manifest_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            ali_app_key: None,
            ali_app_secret: None,
            ali_base_url: None,
            ali_tracking_id: None,
            target_language: default_target_language(),
            target_currency: default_target_currency(),
            default_page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHOPGATE_`
    /// 2. TOML file from `SHOPGATE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHOPGATE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHOPGATE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Affiliate app credentials, checked only when a query is made.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when any of the key, secret, or base
    /// URL is absent.
    pub fn require_app_credentials(&self) -> Result<AffiliateCredentials<'_>, ConfigError> {
        match (self.ali_app_key.as_deref(), self.ali_app_secret.as_deref(), self.ali_base_url.as_deref()) {
            (Some(app_key), Some(app_secret), Some(base_url)) => {
                Ok(AffiliateCredentials { app_key, app_secret, base_url })
            }
            _ => Err(ConfigError::Missing {
                field: "ali_app_key / ali_app_secret / ali_base_url".into(),
                hint: "Set SHOPGATE_ALI_APP_KEY, SHOPGATE_ALI_APP_SECRET, SHOPGATE_ALI_BASE_URL".into(),
            }),
        }
    }

    /// Affiliate tracking id, checked only when a query is made.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the tracking id is not set.
    pub fn require_tracking_id(&self) -> Result<&str, ConfigError> {
        self.ali_tracking_id.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "ali_tracking_id".into(),
            hint: "Set SHOPGATE_ALI_TRACKING_ID environment variable".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./shopgate.sqlite"));
        assert_eq!(config.user_agent, "shopgate/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.target_language, "ar");
        assert_eq!(config.target_currency, "SAR");
        assert_eq!(config.default_page_size, 20);
        assert!(config.ali_app_key.is_none());
        assert!(config.ali_tracking_id.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_require_app_credentials_missing() {
        let config = AppConfig::default();
        let result = config.require_app_credentials();
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_app_credentials_partial() {
        let config = AppConfig { ali_app_key: Some("key".into()), ..Default::default() };
        assert!(config.require_app_credentials().is_err());
    }

    #[test]
    fn test_require_app_credentials_present() {
        let config = AppConfig {
            ali_app_key: Some("key".into()),
            ali_app_secret: Some("secret".into()),
            ali_base_url: Some("https://api-sg.aliexpress.com/sync".into()),
            ..Default::default()
        };
        let creds = config.require_app_credentials().unwrap();
        assert_eq!(creds.app_key, "key");
        assert_eq!(creds.app_secret, "secret");
    }

    #[test]
    fn test_require_tracking_id() {
        let config = AppConfig { ali_tracking_id: Some("track-1".into()), ..Default::default() };
        assert_eq!(config.require_tracking_id().unwrap(), "track-1");

        let config = AppConfig::default();
        assert!(matches!(config.require_tracking_id(), Err(ConfigError::Missing { .. })));
    }
}
