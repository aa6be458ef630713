use color_eyre::{eyre::eyre, Result};
use reqwest::header::CACHE_CONTROL;
use reqwest::StatusCode;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::config::ApiConfig;

use super::cache_control::CachePolicy;
use super::error::FetchError;
use super::types::Item;

/// Source of collection data that also reports whether its last answer may
/// be cached.
pub trait DataFetcher: Send + Sync {
  /// Fetch `resource` and return its records.
  fn fetch_and_validate(
    &self,
    resource: &str,
  ) -> impl Future<Output = Result<Vec<Item>, FetchError>> + Send;

  /// Whether the last successful fetch may be cached. False before any fetch.
  fn is_cacheable(&self) -> bool;

  /// Seconds the last successful fetch may be cached. 0 before any fetch.
  fn ttl_seconds(&self) -> i64;
}

/// Data fetcher backed by a JSON REST API.
pub struct RestApiClient {
  http: reqwest::Client,
  api_root: Url,
  last_policy: Mutex<CachePolicy>,
}

impl RestApiClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let api_root = Url::parse(&config.root)
      .map_err(|e| eyre!("Invalid API root {}: {}", config.root, e))?;

    let mut builder = reqwest::Client::builder().user_agent(concat!(
      env!("CARGO_PKG_NAME"),
      "/",
      env!("CARGO_PKG_VERSION")
    ));
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }

    let http = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      api_root,
      last_policy: Mutex::new(CachePolicy::NOT_CACHEABLE),
    })
  }

  fn url_for(&self, resource: &str) -> String {
    format!(
      "{}/{}",
      self.api_root.as_str().trim_end_matches('/'),
      resource.trim_start_matches('/')
    )
  }

  fn last_policy(&self) -> CachePolicy {
    *self
      .last_policy
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
  }
}

impl DataFetcher for RestApiClient {
  async fn fetch_and_validate(&self, resource: &str) -> Result<Vec<Item>, FetchError> {
    let url = self.url_for(resource);
    debug!(%url, "fetching collection");

    let response = self.http.get(&url).send().await.map_err(|e| {
      error!(%url, error = %e, "no reply from server");
      FetchError::Transport(e)
    })?;

    let status = response.status();
    if status != StatusCode::OK {
      error!(%url, status = status.as_u16(), "unexpected http return code");
      return Err(FetchError::UnexpectedStatus {
        status: status.as_u16(),
      });
    }

    // Several Cache-Control lines are equivalent to one comma separated line
    let cache_control = response
      .headers()
      .get_all(CACHE_CONTROL)
      .iter()
      .map(|v| String::from_utf8_lossy(v.as_bytes()))
      .collect::<Vec<_>>()
      .join(",");

    let body = response.bytes().await.map_err(|e| {
      error!(%url, error = %e, "failed to read response body");
      FetchError::Transport(e)
    })?;

    let items: Vec<Item> = serde_json::from_slice(&body).map_err(|e| {
      error!(%url, error = %e, "api call returned invalid json");
      FetchError::InvalidBody(e)
    })?;

    let policy = CachePolicy::from_header(&cache_control);
    debug!(
      %url,
      count = items.len(),
      cacheable = policy.cacheable,
      ttl = policy.ttl_seconds,
      "fetched collection"
    );
    *self
      .last_policy
      .lock()
      .unwrap_or_else(PoisonError::into_inner) = policy;

    Ok(items)
  }

  fn is_cacheable(&self) -> bool {
    self.last_policy().cacheable
  }

  fn ttl_seconds(&self) -> i64 {
    self.last_policy().ttl_seconds
  }
}
