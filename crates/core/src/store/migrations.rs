//! Store schema migrations.
//!
//! Versioned SQL batches applied in order. The `_migrations` table records
//! what has already run, so reopening an existing store is a no-op.

use tokio_rusqlite::{Connection, params};

use super::Error;

/// Ordered migration batches.
///
/// Each batch uses CREATE IF NOT EXISTS, so replaying one against an
/// existing schema is harmless.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_categories.sql")),
    (2, include_str!("../../migrations/002_asset_cache.sql")),
];

/// Apply any migrations newer than the recorded schema version.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _migrations",
            [],
            |row| row.get(0),
        )?;

        for (version, sql) in MIGRATIONS {
            if *version <= current {
                continue;
            }
            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
