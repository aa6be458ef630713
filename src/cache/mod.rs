//! Key/value caching with per-key expiration.
//!
//! This module provides the persistence used by the read-through model:
//! - String keys of 1 to [`KEY_MAX_LENGTH`] bytes
//! - Optional expiration per entry, non-positive TTLs delete
//! - A SQLite backend that survives restarts

mod storage;
mod traits;

pub use storage::SqliteStore;
pub use traits::{validate_key, CacheError, CacheStore, KEY_MAX_LENGTH};
