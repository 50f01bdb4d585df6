//! SQLite-backed store for categories, cached assets, and the persisted
//! resource manifest.
//!
//! This module provides persistent storage using SQLite with async access
//! via tokio-rusqlite. It holds:
//!
//! - The `categories` table consumed read-only by the products endpoint
//! - The named asset caches (`temp`, `content`) used by the synchronizer
//! - The single persisted manifest used to diff builds across activations

pub mod assets;
pub mod categories;
pub mod connection;
pub mod manifest;
pub mod migrations;

pub use crate::Error;

pub use assets::{CONTENT_CACHE, CachedAsset, TEMP_CACHE};
pub use categories::Category;
pub use connection::StoreDb;
