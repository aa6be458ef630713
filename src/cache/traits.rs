//! Core trait and error type for the key/value cache.

use serde::{de::DeserializeOwned, Serialize};

/// Longest key the store accepts, in bytes.
pub const KEY_MAX_LENGTH: usize = 172;

/// Errors returned by cache stores.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  /// Key is empty or longer than [`KEY_MAX_LENGTH`].
  #[error("key must be a non-empty string with max length {KEY_MAX_LENGTH}, got {len} bytes")]
  InvalidKey { len: usize },

  #[error("cache storage error: {0}")]
  Storage(#[from] rusqlite::Error),

  #[error("failed to encode or decode cached value: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("cache lock poisoned")]
  LockPoisoned,
}

/// A string-keyed store with optional per-key expiration.
///
/// Keys are independent: every operation touches exactly one entry and the
/// last write wins.
pub trait CacheStore: Send + Sync {
  /// Get the value stored under `key`, or `None` if it is missing or expired.
  fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError>;

  /// Store `value` under `key`.
  ///
  /// `ttl` is in seconds. `None` stores without expiration, a non-positive
  /// value deletes the key instead of storing it.
  fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<i64>) -> Result<(), CacheError>;

  /// Remove `key`, returning whether an entry was removed.
  fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// Check that `key` can be used with a [`CacheStore`].
pub fn validate_key(key: &str) -> Result<&str, CacheError> {
  if key.is_empty() || key.len() > KEY_MAX_LENGTH {
    return Err(CacheError::InvalidKey { len: key.len() });
  }
  Ok(key)
}
