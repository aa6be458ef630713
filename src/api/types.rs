use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record of a remote collection, kept as the JSON object the API sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
  /// The integer `id` field, if the record has one.
  pub fn id(&self) -> Option<i64> {
    self.0.get("id").and_then(Value::as_i64)
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.0.get(field)
  }

  /// Text of a string field. Numbers are rendered, other types are `None`.
  pub fn text(&self, field: &str) -> Option<String> {
    text_of(self.0.get(field)?)
  }
}

/// The full, ordered list of records of a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemSet(Vec<Item>);

impl ItemSet {
  pub fn new(items: Vec<Item>) -> Self {
    Self(items)
  }

  pub fn items(&self) -> &[Item] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Last record whose `id` equals `id`, in list order.
  pub fn find_last(&self, id: i64) -> Option<&Item> {
    self.0.iter().rev().find(|item| item.id() == Some(id))
  }
}

pub(crate) fn text_of(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn item(value: Value) -> Item {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_id_requires_integer() {
    assert_eq!(item(json!({"id": 7})).id(), Some(7));
    assert_eq!(item(json!({"id": "7"})).id(), None);
    assert_eq!(item(json!({"id": 7.5})).id(), None);
    assert_eq!(item(json!({"name": "x"})).id(), None);
  }

  #[test]
  fn test_find_last_prefers_later_duplicate() {
    let set = ItemSet::new(vec![
      item(json!({"id": 1, "name": "first"})),
      item(json!({"id": 2, "name": "other"})),
      item(json!({"id": 1, "name": "second"})),
    ]);

    let found = set.find_last(1).unwrap();
    assert_eq!(found.text("name").as_deref(), Some("second"));
    assert!(set.find_last(3).is_none());
  }

  #[test]
  fn test_item_serializes_as_plain_object() {
    let body = concat!(
      r#"[{"name":"Leanne","id":1,"username":"Bret","#,
      r#""address":{"zipcode":"92998","city":"Gwenborough"}}]"#,
    );
    let set: ItemSet = serde_json::from_str(body).unwrap();
    assert_eq!(serde_json::to_string(&set).unwrap(), body);
  }
}
