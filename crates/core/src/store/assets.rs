//! Named asset cache operations.
//!
//! Two named caches exist: `temp` holds shell files staged during install,
//! `content` is the main cache requests are served from. Entries keep the
//! upstream status and content type so a cached response replays faithfully.

use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::StoreDb;
use crate::Error;

/// Staging cache populated during install.
pub const TEMP_CACHE: &str = "temp";

/// Main cache requests are served from.
pub const CONTENT_CACHE: &str = "content";

/// A cached asset response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAsset {
    pub path: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub fetched_at: String,
}

impl StoreDb {
    /// Insert or overwrite an asset in the named cache.
    pub async fn put_asset(&self, cache: &str, asset: &CachedAsset) -> Result<(), Error> {
        let cache = cache.to_string();
        let asset = asset.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO asset_cache (cache, path, status, content_type, body, fetched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(cache, path) DO UPDATE SET
                        status = excluded.status,
                        content_type = excluded.content_type,
                        body = excluded.body,
                        fetched_at = excluded.fetched_at",
                    params![
                        cache,
                        asset.path,
                        asset.status,
                        asset.content_type,
                        asset.body,
                        asset.fetched_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an asset from the named cache.
    ///
    /// Returns None on a cache miss.
    pub async fn get_asset(&self, cache: &str, path: &str) -> Result<Option<CachedAsset>, Error> {
        let cache = cache.to_string();
        let path = path.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedAsset>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT path, status, content_type, body, fetched_at
                     FROM asset_cache WHERE cache = ?1 AND path = ?2",
                )?;

                let result = stmt.query_row(params![cache, path], |row| {
                    Ok(CachedAsset {
                        path: row.get(0)?,
                        status: row.get(1)?,
                        content_type: row.get(2)?,
                        body: row.get(3)?,
                        fetched_at: row.get(4)?,
                    })
                });

                match result {
                    Ok(asset) => Ok(Some(asset)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// All paths currently present in the named cache.
    pub async fn asset_keys(&self, cache: &str) -> Result<Vec<String>, Error> {
        let cache = cache.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT path FROM asset_cache WHERE cache = ?1 ORDER BY path")?;
                let keys = stmt
                    .query_map(params![cache], |row| row.get(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one asset from the named cache.
    ///
    /// Returns true if an entry was removed.
    pub async fn delete_asset(&self, cache: &str, path: &str) -> Result<bool, Error> {
        let cache = cache.to_string();
        let path = path.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM asset_cache WHERE cache = ?1 AND path = ?2",
                    params![cache, path],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Drop every entry in the named cache.
    ///
    /// Returns the number of deleted entries.
    pub async fn wipe_cache(&self, cache: &str) -> Result<u64, Error> {
        let cache = cache.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM asset_cache WHERE cache = ?1", params![cache])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
