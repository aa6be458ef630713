//! Presentation of user records for list and detail views.

use serde_json::Value;

use crate::api::{text_of, Item};

/// Placeholder for fields a record does not carry.
pub const VALUE_NOT_FOUND: &str = "value not found";

/// One line of the users list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
  pub id: i64,
  pub name: String,
  pub username: String,
}

/// Rows for the users list, in record order.
///
/// Records without an integer `id` cannot be opened, so they are left out.
pub fn user_rows(items: &[Item]) -> Vec<UserRow> {
  items
    .iter()
    .filter_map(|item| {
      Some(UserRow {
        id: item.id()?,
        name: item.text("name").unwrap_or_else(not_found),
        username: item.text("username").unwrap_or_else(not_found),
      })
    })
    .collect()
}

/// Labelled lines describing a single user.
pub fn user_details(item: &Item) -> Vec<(&'static str, String)> {
  let field = |name: &str| item.text(name).unwrap_or_else(not_found);

  let address = item.get("address");
  let company = item.get("company");

  vec![
    ("id", field("id")),
    ("name", field("name")),
    ("username", field("username")),
    ("email", field("email")),
    (
      "address",
      format!(
        "{} - {} {} {}. Coordinates(lat, lng): ({}, {})",
        nested(address, &["suite"]),
        nested(address, &["street"]),
        nested(address, &["city"]),
        nested(address, &["zipcode"]),
        nested(address, &["geo", "lat"]),
        nested(address, &["geo", "lng"]),
      ),
    ),
    ("phone", field("phone")),
    ("website", field("website")),
    (
      "company",
      format!(
        "{}: {} - {}",
        nested(company, &["name"]),
        nested(company, &["catchPhrase"]),
        nested(company, &["bs"]),
      ),
    ),
  ]
}

fn nested(value: Option<&Value>, path: &[&str]) -> String {
  value
    .and_then(|v| path.iter().try_fold(v, |v, key| v.get(*key)))
    .and_then(text_of)
    .unwrap_or_else(not_found)
}

fn not_found() -> String {
  VALUE_NOT_FOUND.to_string()
}
