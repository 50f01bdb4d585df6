//! Category lookups.
//!
//! Category rows are externally owned; the products endpoint consumes the
//! keyword field read-only. The upsert exists for seeding and tests.

use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::StoreDb;
use crate::Error;

/// A category row.
///
/// `ali_keywords` holds the raw column text: either a plain keyword string
/// or a JSON-encoded list of keyword strings. Interpretation happens at the
/// query site, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub ali_keywords: Option<String>,
}

impl StoreDb {
    /// Get a category by id.
    ///
    /// Returns None if no row exists.
    pub async fn get_category(&self, id: &str) -> Result<Option<Category>, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Category>, Error> {
                let mut stmt = conn.prepare("SELECT id, ali_keywords FROM categories WHERE id = ?1")?;

                let result = stmt.query_row(params![id], |row| {
                    Ok(Category { id: row.get(0)?, ali_keywords: row.get(1)? })
                });

                match result {
                    Ok(cat) => Ok(Some(cat)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a category row.
    pub async fn upsert_category(&self, id: &str, ali_keywords: Option<&str>) -> Result<(), Error> {
        let id = id.to_string();
        let ali_keywords = ali_keywords.map(str::to_string);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO categories (id, ali_keywords) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET ali_keywords = excluded.ali_keywords",
                    params![id, ali_keywords],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
