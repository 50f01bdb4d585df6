//! Core types and shared functionality for shopgate.
//!
//! This crate provides:
//! - SQLite-backed store (categories, asset caches, persisted manifest)
//! - Resource manifest type and staleness rules
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod manifest;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use manifest::ResourceManifest;
pub use store::{CachedAsset, Category, StoreDb};
