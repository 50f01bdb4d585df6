//! Persisted manifest operations.
//!
//! A single serialized manifest survives across activations so the next
//! upgrade can retain unchanged resources. A corrupt body surfaces as a
//! manifest error, which the synchronizer answers with full teardown.

use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::StoreDb;
use crate::{Error, ResourceManifest};

const MANIFEST_SLOT: &str = "manifest";

impl StoreDb {
    /// Load the persisted manifest, if any.
    pub async fn load_manifest(&self) -> Result<Option<ResourceManifest>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt = conn.prepare("SELECT body FROM manifest_cache WHERE slot = ?1")?;
                let result = stmt.query_row(params![MANIFEST_SLOT], |row| row.get(0));
                match result {
                    Ok(body) => Ok(Some(body)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?
            .map(|body| ResourceManifest::parse(body.as_bytes()))
            .transpose()
    }

    /// Persist a manifest, replacing any previous one.
    pub async fn persist_manifest(&self, manifest: &ResourceManifest) -> Result<(), Error> {
        let body = serde_json::to_string(manifest).map_err(|e| Error::Manifest(e.to_string()))?;
        self.persist_manifest_raw(&body).await
    }

    /// Persist an already-serialized manifest body.
    pub async fn persist_manifest_raw(&self, body: &str) -> Result<(), Error> {
        let body = body.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO manifest_cache (slot, body) VALUES (?1, ?2)
                     ON CONFLICT(slot) DO UPDATE SET body = excluded.body",
                    params![MANIFEST_SLOT, body],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Drop the persisted manifest.
    pub async fn clear_manifest(&self) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM manifest_cache WHERE slot = ?1", params![MANIFEST_SLOT])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
