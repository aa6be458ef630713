//! SQLite implementation of the cache store.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::traits::{validate_key, CacheError, CacheStore};

/// SQLite-based cache storage.
///
/// Besides cache entries it keeps a small `options` table for bookkeeping
/// records that must never expire (see [`crate::install`]).
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open the store at the default location.
  pub fn open_default() -> Result<Self> {
    Self::open(&Self::default_path()?)
  }

  /// Open or create the store at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Open a private in-memory store.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;

    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("u9s").join("cache.db"))
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
    self.conn.lock().map_err(|_| CacheError::LockPoisoned)
  }

  /// Load a bookkeeping record.
  pub fn load_option<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, CacheError> {
    let conn = self.lock()?;

    let value: Option<String> = conn
      .query_row(
        "SELECT value FROM options WHERE name = ?",
        params![name],
        |row| row.get(0),
      )
      .optional()?;

    match value {
      Some(json) => Ok(Some(serde_json::from_str(&json)?)),
      None => Ok(None),
    }
  }

  /// Create or replace a bookkeeping record.
  pub fn save_option<T: Serialize>(&self, name: &str, value: &T) -> Result<(), CacheError> {
    let json = serde_json::to_string(value)?;
    let conn = self.lock()?;

    conn.execute(
      "INSERT OR REPLACE INTO options (name, value) VALUES (?, ?)",
      params![name, json],
    )?;

    Ok(())
  }

  /// Remove a bookkeeping record, returning whether one existed.
  pub fn delete_option(&self, name: &str) -> Result<bool, CacheError> {
    let conn = self.lock()?;
    let removed = conn.execute("DELETE FROM options WHERE name = ?", params![name])?;
    Ok(removed > 0)
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Key/value cache; expires_at is a unix timestamp, NULL means never
CREATE TABLE IF NOT EXISTS cache_entries (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    expires_at INTEGER
);

-- Bookkeeping records that never expire
CREATE TABLE IF NOT EXISTS options (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

impl CacheStore for SqliteStore {
  fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
    let key = validate_key(key)?;
    let conn = self.lock()?;

    let row: Option<(Vec<u8>, Option<i64>)> = conn
      .query_row(
        "SELECT value, expires_at FROM cache_entries WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    let Some((data, expires_at)) = row else {
      return Ok(None);
    };

    if expires_at.is_some_and(|at| at <= now()) {
      conn.execute("DELETE FROM cache_entries WHERE key = ?", params![key])?;
      return Ok(None);
    }

    Ok(Some(serde_json::from_slice(&data)?))
  }

  fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<i64>) -> Result<(), CacheError> {
    let key = validate_key(key)?;

    let expires_at = match ttl {
      None => None,
      Some(ttl) if ttl <= 0 => {
        self.delete(key)?;
        return Ok(());
      }
      Some(ttl) => Some(now().saturating_add(ttl)),
    };

    let data = serde_json::to_vec(value)?;
    let conn = self.lock()?;

    conn.execute(
      "INSERT OR REPLACE INTO cache_entries (key, value, expires_at) VALUES (?, ?, ?)",
      params![key, data, expires_at],
    )?;

    Ok(())
  }

  fn delete(&self, key: &str) -> Result<bool, CacheError> {
    let key = validate_key(key)?;
    let conn = self.lock()?;
    let removed = conn.execute("DELETE FROM cache_entries WHERE key = ?", params![key])?;
    Ok(removed > 0)
  }
}

fn now() -> i64 {
  Utc::now().timestamp()
}
