//! Remote REST API access.
//!
//! Fetches JSON collections, validates them strictly, and derives from each
//! response's `Cache-Control` header whether the data may be cached.

pub mod cache_control;
mod client;
mod error;
mod types;

pub use client::{DataFetcher, RestApiClient};
pub use error::FetchError;
pub use types::{Item, ItemSet};
pub(crate) use types::text_of;
