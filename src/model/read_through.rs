use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::{DataFetcher, Item, ItemSet};
use crate::cache::{validate_key, CacheError, CacheStore};

use super::{ErrorData, ItemModel};

/// Model that serves a collection from the cache and falls back to the
/// fetcher on a miss.
///
/// A cached collection is trusted until the store expires it; there is no
/// revalidation against the source. Fetched data is stored only when the
/// fetcher reports it cacheable. Concurrent misses each fetch, one at a
/// time, so the cacheability read after a fetch belongs to that fetch.
pub struct ReadThroughModel<F, S> {
  fetcher: F,
  store: Arc<S>,
  model_key: String,
  cache_key: String,
  fetch_lock: Mutex<()>,
}

impl<F: DataFetcher, S: CacheStore> ReadThroughModel<F, S> {
  /// Create a model for `model_key`, cached under `{cache_prefix}_{model_key}`.
  ///
  /// Fails if the derived key is not a valid cache key.
  pub fn new(
    fetcher: F,
    store: Arc<S>,
    cache_prefix: &str,
    model_key: &str,
  ) -> Result<Self, CacheError> {
    let cache_key = format!("{}_{}", cache_prefix, model_key);
    validate_key(&cache_key)?;

    Ok(Self {
      fetcher,
      store,
      model_key: model_key.to_string(),
      cache_key,
      fetch_lock: Mutex::new(()),
    })
  }

  pub fn error_data(&self, message: impl Into<String>) -> ErrorData {
    ErrorData::new(message)
  }
}

impl<F: DataFetcher, S: CacheStore> ItemModel for ReadThroughModel<F, S> {
  async fn all_items(&self) -> Result<ItemSet, ErrorData> {
    match self.store.get::<ItemSet>(&self.cache_key) {
      Ok(Some(items)) => {
        debug!(key = %self.cache_key, count = items.len(), "cache hit");
        return Ok(items);
      }
      Ok(None) => debug!(key = %self.cache_key, "cache miss"),
      Err(e) => warn!(key = %self.cache_key, error = %e, "cache read failed, treating as miss"),
    }

    // The fetcher's policy accessors describe its last fetch only
    let _guard = self.fetch_lock.lock().await;

    let items = match self.fetcher.fetch_and_validate(&self.model_key).await {
      Ok(items) => ItemSet::new(items),
      Err(e) => return Err(self.error_data(e.to_string())),
    };

    if self.fetcher.is_cacheable() {
      let ttl = self.fetcher.ttl_seconds();
      match self.store.set(&self.cache_key, &items, Some(ttl)) {
        Ok(()) => debug!(key = %self.cache_key, ttl, "cached collection"),
        Err(e) => warn!(key = %self.cache_key, error = %e, "failed to cache collection"),
      }
    }

    Ok(items)
  }

  async fn single_item(&self, id: i64) -> Result<Item, ErrorData> {
    let items = self.all_items().await?;

    // Duplicate ids resolve to the last one in list order
    items
      .find_last(id)
      .cloned()
      .ok_or_else(|| self.error_data(format!("item {} not found", id)))
  }

  fn cache_key(&self) -> &str {
    &self.cache_key
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::FetchError;
  use crate::cache::{SqliteStore, KEY_MAX_LENGTH};
  use serde::{de::DeserializeOwned, Serialize};
  use serde_json::json;
  use std::collections::VecDeque;
  use std::sync::atomic::{AtomicUsize, Ordering};

  enum Outcome {
    Items(Vec<Item>),
    Status(u16),
    InvalidJson,
  }

  struct StubFetcher {
    outcome: Outcome,
    cacheable: bool,
    ttl: i64,
    calls: AtomicUsize,
  }

  impl StubFetcher {
    fn returning(items: Vec<Item>, cacheable: bool, ttl: i64) -> Self {
      Self {
        outcome: Outcome::Items(items),
        cacheable,
        ttl,
        calls: AtomicUsize::new(0),
      }
    }

    fn failing(outcome: Outcome) -> Self {
      Self {
        outcome,
        cacheable: false,
        ttl: 0,
        calls: AtomicUsize::new(0),
      }
    }

    fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  impl DataFetcher for StubFetcher {
    async fn fetch_and_validate(&self, resource: &str) -> Result<Vec<Item>, FetchError> {
      assert_eq!(resource, "users");
      self.calls.fetch_add(1, Ordering::SeqCst);
      match &self.outcome {
        Outcome::Items(items) => Ok(items.clone()),
        Outcome::Status(status) => Err(FetchError::UnexpectedStatus { status: *status }),
        Outcome::InvalidJson => Err(FetchError::InvalidBody(
          serde_json::from_str::<Vec<Item>>("[{").unwrap_err(),
        )),
      }
    }

    fn is_cacheable(&self) -> bool {
      self.cacheable
    }

    fn ttl_seconds(&self) -> i64 {
      self.ttl
    }
  }

  /// Fetcher that answers from a queue and records the policy of each answer
  /// before yielding, so overlapping fetches can clobber each other's policy.
  struct SequencedFetcher {
    answers: std::sync::Mutex<VecDeque<(Vec<Item>, bool, i64)>>,
    policy: std::sync::Mutex<(bool, i64)>,
  }

  impl SequencedFetcher {
    fn new(answers: Vec<(Vec<Item>, bool, i64)>) -> Self {
      Self {
        answers: std::sync::Mutex::new(answers.into()),
        policy: std::sync::Mutex::new((false, 0)),
      }
    }
  }

  impl DataFetcher for SequencedFetcher {
    async fn fetch_and_validate(&self, _resource: &str) -> Result<Vec<Item>, FetchError> {
      let (items, cacheable, ttl) = self.answers.lock().unwrap().pop_front().unwrap();
      *self.policy.lock().unwrap() = (cacheable, ttl);
      tokio::task::yield_now().await;
      Ok(items)
    }

    fn is_cacheable(&self) -> bool {
      self.policy.lock().unwrap().0
    }

    fn ttl_seconds(&self) -> i64 {
      self.policy.lock().unwrap().1
    }
  }

  /// In-memory store that counts calls.
  struct CountingStore {
    inner: SqliteStore,
    sets: AtomicUsize,
  }

  impl CountingStore {
    fn new() -> Self {
      Self {
        inner: SqliteStore::open_in_memory().unwrap(),
        sets: AtomicUsize::new(0),
      }
    }

    fn sets(&self) -> usize {
      self.sets.load(Ordering::SeqCst)
    }
  }

  impl CacheStore for CountingStore {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
      self.inner.get(key)
    }

    fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<i64>) -> Result<(), CacheError> {
      self.sets.fetch_add(1, Ordering::SeqCst);
      self.inner.set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
      self.inner.delete(key)
    }
  }

  fn users(count: i64) -> Vec<Item> {
    (1..=count)
      .map(|id| {
        serde_json::from_value(json!({
          "id": id,
          "name": format!("User {}", id),
          "username": format!("user{}", id),
        }))
        .unwrap()
      })
      .collect()
  }

  fn build_model(
    fetcher: StubFetcher,
    store: &Arc<CountingStore>,
  ) -> ReadThroughModel<StubFetcher, CountingStore> {
    ReadThroughModel::new(fetcher, Arc::clone(store), "u9s", "users").unwrap()
  }

  #[test]
  fn test_cache_key_derived_from_prefix() {
    let store = Arc::new(CountingStore::new());
    let model = build_model(StubFetcher::returning(vec![], false, 0), &store);
    assert_eq!(model.cache_key(), "u9s_users");
  }

  #[test]
  fn test_overlong_cache_key_rejected_at_construction() {
    let store = Arc::new(CountingStore::new());
    let prefix = "p".repeat(KEY_MAX_LENGTH);
    let result = ReadThroughModel::new(
      StubFetcher::returning(vec![], false, 0),
      store,
      &prefix,
      "users",
    );
    assert!(matches!(result, Err(CacheError::InvalidKey { .. })));
  }

  #[tokio::test]
  async fn test_cache_hit_skips_fetcher() {
    let store = Arc::new(CountingStore::new());
    store
      .inner
      .set("u9s_users", &ItemSet::new(users(3)), None)
      .unwrap();

    let model = build_model(StubFetcher::returning(users(10), true, 60), &store);
    let items = model.all_items().await.unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(model.fetcher.calls(), 0);
  }

  #[tokio::test]
  async fn test_miss_with_cacheable_data_populates_cache() {
    let store = Arc::new(CountingStore::new());
    let model = build_model(StubFetcher::returning(users(2), true, 300), &store);

    let items = model.all_items().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(store.sets(), 1);

    // Second call is served from the cache
    let again = model.all_items().await.unwrap();
    assert_eq!(again, items);
    assert_eq!(model.fetcher.calls(), 1);
  }

  #[tokio::test]
  async fn test_miss_with_uncacheable_data_never_stores() {
    let store = Arc::new(CountingStore::new());
    let model = build_model(StubFetcher::returning(users(2), false, 0), &store);

    model.all_items().await.unwrap();
    model.all_items().await.unwrap();

    assert_eq!(store.sets(), 0);
    assert_eq!(model.fetcher.calls(), 2);
    assert!(store.get::<ItemSet>("u9s_users").unwrap().is_none());
  }

  #[tokio::test]
  async fn test_fetch_failure_becomes_error_data() {
    let store = Arc::new(CountingStore::new());

    let model = build_model(StubFetcher::failing(Outcome::Status(500)), &store);
    let err = model.all_items().await.unwrap_err();
    assert_eq!(err.messages(), ["server replied with an error"]);

    let model = build_model(StubFetcher::failing(Outcome::InvalidJson), &store);
    let err = model.all_items().await.unwrap_err();
    assert_eq!(err.to_string(), "server replied with invalid format");

    assert_eq!(store.sets(), 0);
  }

  #[tokio::test]
  async fn test_single_item_found() {
    let store = Arc::new(CountingStore::new());
    let model = build_model(StubFetcher::returning(users(10), false, 0), &store);

    let item = model.single_item(4).await.unwrap();
    assert_eq!(item.id(), Some(4));
    assert_eq!(item.text("username").as_deref(), Some("user4"));
  }

  #[tokio::test]
  async fn test_single_item_missing() {
    let store = Arc::new(CountingStore::new());
    let model = build_model(StubFetcher::returning(users(10), false, 0), &store);

    let err = model.single_item(11).await.unwrap_err();
    assert_eq!(err.messages(), ["item 11 not found"]);
  }

  #[tokio::test]
  async fn test_single_item_propagates_fetch_error() {
    let store = Arc::new(CountingStore::new());
    let model = build_model(StubFetcher::failing(Outcome::Status(404)), &store);

    let err = model.single_item(1).await.unwrap_err();
    assert_eq!(err.messages(), ["server replied with an error"]);
  }

  #[tokio::test]
  async fn test_single_item_duplicate_ids_last_wins() {
    let mut items = users(3);
    items.push(
      serde_json::from_value(json!({"id": 2, "name": "Duplicate", "username": "dup"})).unwrap(),
    );

    let store = Arc::new(CountingStore::new());
    let model = build_model(StubFetcher::returning(items, false, 0), &store);

    let item = model.single_item(2).await.unwrap();
    assert_eq!(item.text("name").as_deref(), Some("Duplicate"));
  }

  #[tokio::test]
  async fn test_single_item_uses_cached_collection() {
    let store = Arc::new(CountingStore::new());
    let model = build_model(StubFetcher::returning(users(5), true, 120), &store);

    model.single_item(1).await.unwrap();
    model.single_item(5).await.unwrap();

    assert_eq!(model.fetcher.calls(), 1);
  }

  #[tokio::test]
  async fn test_concurrent_misses_store_with_their_own_policy() {
    let store = Arc::new(CountingStore::new());
    let fetcher = SequencedFetcher::new(vec![(users(2), true, 300), (users(5), false, 0)]);
    let model = ReadThroughModel::new(fetcher, Arc::clone(&store), "u9s", "users").unwrap();

    let (first, second) = tokio::join!(model.all_items(), model.all_items());
    assert_eq!(first.unwrap().len(), 2);
    assert_eq!(second.unwrap().len(), 5);

    // Only the cacheable answer is stored
    assert_eq!(store.sets(), 1);
    let cached = store.get::<ItemSet>("u9s_users").unwrap().unwrap();
    assert_eq!(cached.len(), 2);
  }
}
