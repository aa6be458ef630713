use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_API_ROOT: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_CACHE_PREFIX: &str = "u9s";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Namespace for cache keys, e.g. `u9s_users`
  #[serde(default = "default_cache_prefix")]
  pub cache_prefix: String,
  #[serde(default)]
  pub cache: CacheConfig,
  /// Write debug logs to the data directory
  #[serde(default)]
  pub debug: bool,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
  /// Base URL; resources are fetched from `{root}/{resource}`
  #[serde(default = "default_api_root")]
  pub root: String,
  /// Whole-request timeout in seconds, none by default
  pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
  /// SQLite file holding the cache (default: $XDG_DATA_HOME/u9s/cache.db)
  pub path: Option<PathBuf>,
}

fn default_api_root() -> String {
  DEFAULT_API_ROOT.to_string()
}

fn default_cache_prefix() -> String {
  DEFAULT_CACHE_PREFIX.to_string()
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      root: default_api_root(),
      timeout_secs: None,
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      cache_prefix: default_cache_prefix(),
      cache: CacheConfig::default(),
      debug: false,
      title: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./u9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/u9s/config.yaml
  ///
  /// Without any file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("u9s.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("u9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Header title: the configured one, or the API host.
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    url::Url::parse(&self.api.root)
      .ok()
      .and_then(|u| u.host_str().map(String::from))
      .unwrap_or_else(|| self.api.root.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.root, "https://jsonplaceholder.typicode.com");
    assert_eq!(config.cache_prefix, "u9s");
    assert!(!config.debug);
    assert_eq!(config.display_title(), "jsonplaceholder.typicode.com");
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let file = write_config("api:\n  timeout_secs: 10\ndebug: true\n");
    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.api.root, DEFAULT_API_ROOT);
    assert_eq!(config.api.timeout_secs, Some(10));
    assert!(config.debug);
    assert_eq!(config.cache_prefix, DEFAULT_CACHE_PREFIX);
  }

  #[test]
  fn test_full_file() {
    let file = write_config(concat!(
      "api:\n",
      "  root: http://localhost:8080/v1\n",
      "cache_prefix: team\n",
      "cache:\n",
      "  path: /tmp/u9s.db\n",
      "title: Staff\n",
    ));
    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.api.root, "http://localhost:8080/v1");
    assert_eq!(config.cache_prefix, "team");
    assert_eq!(config.cache.path, Some(PathBuf::from("/tmp/u9s.db")));
    assert_eq!(config.display_title(), "Staff");
  }

  #[test]
  fn test_unknown_field_rejected() {
    let file = write_config("api_root: http://example.com\n");
    assert!(Config::load(Some(file.path())).is_err());
  }

  #[test]
  fn test_missing_explicit_path_rejected() {
    let result = Config::load(Some(Path::new("/definitely/not/here/u9s.yaml")));
    assert!(result.is_err());
  }
}
