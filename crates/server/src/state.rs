//! Shared server state.

use shopgate_client::{ShellClient, ShellConfig};
use shopgate_core::{AppConfig, Error, ResourceManifest, StoreDb};

/// Everything the handlers need: configuration, the store, the shell fetch
/// client, and the current build manifest.
pub struct AppState {
    pub config: AppConfig,
    pub db: StoreDb,
    pub shell: ShellClient,
    pub manifest: ResourceManifest,
}

impl AppState {
    /// Build the state from loaded configuration and an open store.
    ///
    /// A missing or unreadable manifest file disables asset interception
    /// but never prevents startup; the products endpoint does not depend
    /// on it.
    pub fn new(config: AppConfig, db: StoreDb) -> Result<Self, Error> {
        let manifest = match ResourceManifest::load(&config.manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("no usable resource manifest: {e}");
                ResourceManifest::default()
            }
        };

        Self::new_with_manifest(config, db, manifest)
    }

    /// Build the state with an explicit manifest instead of reading one
    /// from disk.
    pub fn new_with_manifest(
        config: AppConfig,
        db: StoreDb,
        manifest: ResourceManifest,
    ) -> Result<Self, Error> {
        let shell = ShellClient::new(ShellConfig {
            origin: config.shell_origin.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        })?;

        Ok(Self { config, db, shell, manifest })
    }
}
