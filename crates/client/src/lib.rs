//! Client code for shopgate.
//!
//! This crate provides the signed affiliate product-query client and the
//! shell-resource fetch client used by the server.

pub mod affiliate;
pub mod fetch;

pub use affiliate::{AffiliateClient, AffiliateConfig, AffiliateError, Product, ProductQuery};
pub use fetch::{CacheMode, FetchedAsset, ShellClient, ShellConfig};
