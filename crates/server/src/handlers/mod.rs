//! HTTP request handlers.

pub mod assets;
pub mod control;
pub mod products;
