//! Read-through models over remote collections.

mod read_through;

use serde::Serialize;
use std::future::Future;

use crate::api::{Item, ItemSet, RestApiClient};
use crate::cache::SqliteStore;

pub use read_through::ReadThroughModel;

/// Model key of the users collection; also its API resource path.
pub const USERS_MODEL_KEY: &str = "users";

/// The users model as wired in the application.
pub type UsersModel = ReadThroughModel<RestApiClient, SqliteStore>;

/// Human-readable failure returned by a model instead of data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", .messages.join("; "))]
pub struct ErrorData {
  messages: Vec<String>,
}

impl ErrorData {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      messages: vec![message.into()],
    }
  }

  pub fn messages(&self) -> &[String] {
    &self.messages
  }
}

/// Access to one collection of items.
pub trait ItemModel: Send + Sync {
  /// All items of the collection.
  fn all_items(&self) -> impl Future<Output = Result<ItemSet, ErrorData>> + Send;

  /// The item whose `id` is `id`.
  fn single_item(&self, id: i64) -> impl Future<Output = Result<Item, ErrorData>> + Send;

  /// Key the collection is cached under.
  fn cache_key(&self) -> &str;
}
