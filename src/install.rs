//! Tracking of the cache keys this tool owns.
//!
//! On start the installer records which keys the models cache under, so that
//! an upgrade or an explicit purge can remove exactly those entries.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{CacheError, CacheStore, SqliteStore};

/// Bookkeeping record saved in the store's options table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
  pub installed_version: String,
  #[serde(default)]
  pub cache_keys: Vec<String>,
}

/// What [`Installer::after_install`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
  /// Options already matched this version
  AlreadyInstalled,
  /// First run, options written
  Installed,
  /// Another version was installed; its keys were purged
  Upgraded { from: String },
}

fn option_name(cache_prefix: &str) -> String {
  format!("{}_options", cache_prefix)
}

pub struct Installer<'a> {
  store: &'a SqliteStore,
  cache_prefix: String,
  cache_keys: Vec<String>,
  version: String,
}

impl<'a> Installer<'a> {
  pub fn new(store: &'a SqliteStore, cache_prefix: &str, cache_keys: Vec<String>) -> Self {
    Self {
      store,
      cache_prefix: cache_prefix.to_string(),
      cache_keys,
      version: env!("CARGO_PKG_VERSION").to_string(),
    }
  }

  #[cfg(test)]
  fn with_version(mut self, version: &str) -> Self {
    self.version = version.to_string();
    self
  }

  /// Record the current version and cache keys, purging keys left by a
  /// different version first.
  pub fn after_install(&self) -> Result<InstallOutcome, CacheError> {
    let name = option_name(&self.cache_prefix);
    let existing: Option<InstallOptions> = self.store.load_option(&name)?;

    let outcome = match existing {
      Some(options) if options.installed_version == self.version => {
        return Ok(InstallOutcome::AlreadyInstalled);
      }
      Some(options) => {
        // Cached data may have a different shape or source in this version
        let removed = Uninstaller::new(self.store, &self.cache_prefix).delete_tracked_keys()?;
        info!(
          from = %options.installed_version,
          to = %self.version,
          removed,
          "upgrade detected, purged cached data"
        );
        InstallOutcome::Upgraded {
          from: options.installed_version,
        }
      }
      None => {
        info!(version = %self.version, "first run, recording cache keys");
        InstallOutcome::Installed
      }
    };

    self.store.save_option(
      &name,
      &InstallOptions {
        installed_version: self.version.clone(),
        cache_keys: self.cache_keys.clone(),
      },
    )?;

    Ok(outcome)
  }
}

pub struct Uninstaller<'a> {
  store: &'a SqliteStore,
  cache_prefix: String,
}

impl<'a> Uninstaller<'a> {
  pub fn new(store: &'a SqliteStore, cache_prefix: &str) -> Self {
    Self {
      store,
      cache_prefix: cache_prefix.to_string(),
    }
  }

  /// Delete every tracked cache entry, returning how many existed.
  pub fn delete_tracked_keys(&self) -> Result<usize, CacheError> {
    let options: Option<InstallOptions> =
      self.store.load_option(&option_name(&self.cache_prefix))?;

    let Some(options) = options else {
      return Ok(0);
    };

    let mut removed = 0;
    for key in &options.cache_keys {
      match self.store.delete(key) {
        Ok(true) => removed += 1,
        Ok(false) => {}
        Err(CacheError::InvalidKey { .. }) => warn!(%key, "skipping invalid tracked key"),
        Err(e) => return Err(e),
      }
    }

    Ok(removed)
  }

  /// Delete tracked entries and the bookkeeping record itself.
  pub fn uninstall(&self) -> Result<usize, CacheError> {
    let removed = self.delete_tracked_keys()?;
    self.store.delete_option(&option_name(&self.cache_prefix))?;
    info!(removed, "uninstalled");
    Ok(removed)
  }
}
