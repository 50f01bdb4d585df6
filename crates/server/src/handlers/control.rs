//! Sync control endpoint.
//!
//! Accepts the two worker commands as a plain string body, optionally
//! JSON-quoted.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;
use crate::sync::{self, SyncCommand};

pub async fn control(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let command: SyncCommand = body.trim().trim_matches('"').parse()?;

    match command {
        SyncCommand::ForceActivate => {
            sync::install_and_activate(&state).await?;
            Ok(Json(json!({ "ok": true, "command": "skipWaiting" })))
        }
        SyncCommand::ForceFullDownload => {
            let added = sync::download_offline(&state).await?;
            Ok(Json(json!({ "ok": true, "command": "downloadOffline", "added": added })))
        }
    }
}

#[cfg(test)]
mod tests {
    use shopgate_core::{AppConfig, Error, ResourceManifest, StoreDb};

    use super::*;

    async fn test_state() -> Arc<AppState> {
        let config = AppConfig {
            shell_origin: "http://127.0.0.1:9".into(),
            timeout_ms: 2_000,
            ..Default::default()
        };
        let db = StoreDb::open_in_memory().await.unwrap();
        Arc::new(AppState::new_with_manifest(config, db, ResourceManifest::default()).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_command_rejected() {
        let state = test_state().await;
        let result = control(State(state), "reboot".into()).await;
        assert!(matches!(result, Err(ApiError(Error::InvalidInput(_)))));
    }

    #[tokio::test]
    async fn test_quoted_command_accepted() {
        // An empty manifest makes the full cycle a no-op, so the quoted
        // form exercises parsing end to end.
        let state = test_state().await;
        let result = control(State(state), "\"skipWaiting\"".into()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_download_offline_reports_count() {
        let state = test_state().await;
        let Json(body) = control(State(state), "downloadOffline".into()).await.unwrap();
        assert_eq!(body["added"], 0);
        assert_eq!(body["ok"], true);
    }
}
