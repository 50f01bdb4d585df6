//! Cache synchronizer lifecycle.
//!
//! Mirrors an install/activate upgrade cycle: `install` stages every shell
//! resource into the temp cache with cache-bypassing fetches, `activate`
//! diffs the persisted manifest against the current one, evicts stale
//! entries from the content cache, promotes the staged files, and persists
//! the new manifest. Any activation failure tears down all three caches so
//! the next start rebuilds from scratch instead of serving a half-upgraded
//! shell.

use std::collections::HashSet;
use std::str::FromStr;

use shopgate_client::CacheMode;
use shopgate_core::Error;
use shopgate_core::store::{CONTENT_CACHE, TEMP_CACHE};

use crate::state::AppState;

/// Commands accepted on the sync control endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommand {
    /// Run the full install/activate cycle immediately.
    ForceActivate,
    /// Download every manifest resource missing from the content cache.
    ForceFullDownload,
}

impl FromStr for SyncCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "skipWaiting" => Ok(Self::ForceActivate),
            "downloadOffline" => Ok(Self::ForceFullDownload),
            other => Err(Error::InvalidInput(format!("unknown sync command: {other}"))),
        }
    }
}

/// Full upgrade cycle: stage the shell, then reconcile the content cache.
pub async fn install_and_activate(state: &AppState) -> Result<(), Error> {
    install(state).await?;
    activate(state).await
}

/// Stage every shell resource into the temp cache.
///
/// Fetches bypass intermediary caches so a stale CDN copy cannot poison an
/// upgrade. Any non-2xx response fails the whole install; a partial shell
/// must never be promoted.
pub async fn install(state: &AppState) -> Result<(), Error> {
    for path in &state.manifest.shell {
        let fetched = state.shell.fetch(path, CacheMode::Reload).await?;
        if !fetched.is_success() {
            return Err(Error::UpstreamHttp {
                status: fetched.status,
                body: format!("shell resource {path}"),
            });
        }
        state.db.put_asset(TEMP_CACHE, &fetched.to_cached()).await?;
    }

    tracing::info!("staged {} shell resources", state.manifest.shell.len());
    Ok(())
}

/// Reconcile the content cache with the current manifest.
pub async fn activate(state: &AppState) -> Result<(), Error> {
    match activate_inner(state).await {
        Ok(()) => {
            tracing::info!("activation complete");
            Ok(())
        }
        Err(err) => {
            tracing::error!("activation failed, dropping caches: {err}");
            teardown(state).await;
            Err(err)
        }
    }
}

async fn activate_inner(state: &AppState) -> Result<(), Error> {
    match state.db.load_manifest().await? {
        // Cold start: nothing to diff against, so nothing cached can be
        // trusted.
        None => {
            let dropped = state.db.wipe_cache(CONTENT_CACHE).await?;
            if dropped > 0 {
                tracing::warn!("no previous manifest; dropped {dropped} cached resources");
            }
        }
        Some(old) => {
            for key in state.db.asset_keys(CONTENT_CACHE).await? {
                if state.manifest.is_stale(&old, &key) {
                    tracing::debug!("evicting stale resource {}", key);
                    state.db.delete_asset(CONTENT_CACHE, &key).await?;
                }
            }
        }
    }

    promote_temp(state).await?;
    state.db.persist_manifest(&state.manifest).await?;
    state.db.wipe_cache(TEMP_CACHE).await?;
    Ok(())
}

/// Copy staged shell files into the content cache, overwriting any entry
/// the diff preserved.
async fn promote_temp(state: &AppState) -> Result<(), Error> {
    for key in state.db.asset_keys(TEMP_CACHE).await? {
        if let Some(asset) = state.db.get_asset(TEMP_CACHE, &key).await? {
            state.db.put_asset(CONTENT_CACHE, &asset).await?;
        }
    }
    Ok(())
}

/// Best-effort removal of both caches and the persisted manifest.
async fn teardown(state: &AppState) {
    if let Err(e) = state.db.wipe_cache(CONTENT_CACHE).await {
        tracing::warn!("failed to drop content cache: {e}");
    }
    if let Err(e) = state.db.wipe_cache(TEMP_CACHE).await {
        tracing::warn!("failed to drop temp cache: {e}");
    }
    if let Err(e) = state.db.clear_manifest().await {
        tracing::warn!("failed to clear persisted manifest: {e}");
    }
}

/// Fetch every manifest resource missing from the content cache.
///
/// Returns the number of resources added.
pub async fn download_offline(state: &AppState) -> Result<u64, Error> {
    let cached: HashSet<String> = state.db.asset_keys(CONTENT_CACHE).await?.into_iter().collect();

    let mut added = 0;
    for key in state.manifest.resources.keys() {
        if cached.contains(key) {
            continue;
        }
        let fetched = state.shell.fetch(key, CacheMode::Default).await?;
        if !fetched.is_success() {
            return Err(Error::UpstreamHttp { status: fetched.status, body: format!("resource {key}") });
        }
        state.db.put_asset(CONTENT_CACHE, &fetched.to_cached()).await?;
        added += 1;
    }

    tracing::info!("offline download added {added} resources");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use shopgate_core::store::CachedAsset;
    use shopgate_core::{AppConfig, ResourceManifest, StoreDb};

    use super::*;

    fn manifest(entries: &[(&str, &str)], shell: &[&str]) -> ResourceManifest {
        ResourceManifest {
            resources: entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            shell: shell.iter().map(|s| s.to_string()).collect(),
        }
    }

    // Unroutable origin: any test that reaches the network fails fast.
    async fn test_state(manifest: ResourceManifest) -> AppState {
        let config = AppConfig {
            shell_origin: "http://127.0.0.1:9".into(),
            timeout_ms: 2_000,
            ..Default::default()
        };
        let db = StoreDb::open_in_memory().await.unwrap();
        AppState::new_with_manifest(config, db, manifest).unwrap()
    }

    fn asset(path: &str, body: &[u8]) -> CachedAsset {
        CachedAsset {
            path: path.to_string(),
            status: 200,
            content_type: Some("application/javascript".to_string()),
            body: body.to_vec(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_sync_command_parse() {
        assert_eq!("skipWaiting".parse::<SyncCommand>().unwrap(), SyncCommand::ForceActivate);
        assert_eq!("downloadOffline".parse::<SyncCommand>().unwrap(), SyncCommand::ForceFullDownload);
        assert!(matches!("reboot".parse::<SyncCommand>(), Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_cold_start_wipes_content_cache() {
        let state = test_state(manifest(&[("main.js", "v2")], &[])).await;

        // Stray entry with no persisted manifest covering it.
        state.db.put_asset(CONTENT_CACHE, &asset("stray.js", b"old")).await.unwrap();
        state.db.put_asset(TEMP_CACHE, &asset("main.js", b"staged")).await.unwrap();

        activate(&state).await.unwrap();

        assert!(state.db.get_asset(CONTENT_CACHE, "stray.js").await.unwrap().is_none());
        let promoted = state.db.get_asset(CONTENT_CACHE, "main.js").await.unwrap().unwrap();
        assert_eq!(promoted.body, b"staged");
        assert!(state.db.asset_keys(TEMP_CACHE).await.unwrap().is_empty());
        assert_eq!(state.db.load_manifest().await.unwrap().unwrap(), state.manifest);
    }

    #[tokio::test]
    async fn test_activation_preserves_and_evicts() {
        let state = test_state(manifest(&[("keep.js", "same"), ("changed.js", "v2"), ("new.js", "v1")], &[])).await;

        let old = manifest(&[("keep.js", "same"), ("changed.js", "v1"), ("gone.js", "v1")], &[]);
        state.db.persist_manifest(&old).await.unwrap();
        state.db.put_asset(CONTENT_CACHE, &asset("keep.js", b"keep")).await.unwrap();
        state.db.put_asset(CONTENT_CACHE, &asset("changed.js", b"old")).await.unwrap();
        state.db.put_asset(CONTENT_CACHE, &asset("gone.js", b"dead")).await.unwrap();
        state.db.put_asset(TEMP_CACHE, &asset("changed.js", b"fresh")).await.unwrap();

        activate(&state).await.unwrap();

        // Unchanged fingerprint survives the upgrade without a refetch.
        assert_eq!(state.db.get_asset(CONTENT_CACHE, "keep.js").await.unwrap().unwrap().body, b"keep");
        // Changed fingerprint evicted, then replaced by the staged copy.
        assert_eq!(state.db.get_asset(CONTENT_CACHE, "changed.js").await.unwrap().unwrap().body, b"fresh");
        // Dropped from the new manifest entirely.
        assert!(state.db.get_asset(CONTENT_CACHE, "gone.js").await.unwrap().is_none());
        assert_eq!(state.db.load_manifest().await.unwrap().unwrap(), state.manifest);
    }

    #[tokio::test]
    async fn test_activation_evicts_entry_old_manifest_never_listed() {
        let state = test_state(manifest(&[("main.js", "v1")], &[])).await;

        state.db.persist_manifest(&manifest(&[], &[])).await.unwrap();
        state.db.put_asset(CONTENT_CACHE, &asset("main.js", b"untracked")).await.unwrap();

        activate(&state).await.unwrap();

        assert!(state.db.get_asset(CONTENT_CACHE, "main.js").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_manifest_tears_down_everything() {
        let state = test_state(manifest(&[("main.js", "v1")], &[])).await;

        state.db.persist_manifest_raw("not json").await.unwrap();
        state.db.put_asset(CONTENT_CACHE, &asset("main.js", b"cached")).await.unwrap();
        state.db.put_asset(TEMP_CACHE, &asset("main.js", b"staged")).await.unwrap();

        let result = activate(&state).await;
        assert!(matches!(result, Err(Error::Manifest(_))));

        assert!(state.db.asset_keys(CONTENT_CACHE).await.unwrap().is_empty());
        assert!(state.db.asset_keys(TEMP_CACHE).await.unwrap().is_empty());
        assert!(state.db.load_manifest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_install_fails_on_unreachable_origin() {
        let state = test_state(manifest(&[], &["main.js"])).await;
        let result = install(&state).await;
        assert!(matches!(result, Err(Error::Network(_))));
        assert!(state.db.asset_keys(TEMP_CACHE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_with_empty_shell_is_a_no_op() {
        let state = test_state(manifest(&[("main.js", "v1")], &[])).await;
        install(&state).await.unwrap();
        assert!(state.db.asset_keys(TEMP_CACHE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_offline_skips_cached_resources() {
        let state = test_state(manifest(&[("a.js", "v1"), ("b.js", "v1")], &[])).await;

        state.db.put_asset(CONTENT_CACHE, &asset("a.js", b"a")).await.unwrap();
        state.db.put_asset(CONTENT_CACHE, &asset("b.js", b"b")).await.unwrap();

        // Everything already cached: no fetch is attempted, so the
        // unreachable origin is never touched.
        assert_eq!(download_offline(&state).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_download_offline_fails_on_missing_resource() {
        let state = test_state(manifest(&[("a.js", "v1")], &[])).await;
        let result = download_offline(&state).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
