//! Cache-Control parsing and the cacheability decision for API responses.

use std::collections::HashMap;

/// Directives that make a response uncacheable regardless of `max-age`.
///
/// `no-cache` strictly means "revalidate before use", but this cache has no
/// revalidation, so it is handled exactly like `no-store`.
const UNCACHEABLE_DIRECTIVES: [&str; 3] = ["private", "no-cache", "no-store"];

/// Parsed `Cache-Control` header: directive name to optional value.
///
/// Names are trimmed and lowercased, values trimmed. A repeated directive
/// keeps the last value seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheDirectives {
  directives: HashMap<String, Option<String>>,
}

impl CacheDirectives {
  pub fn parse(header: &str) -> Self {
    let mut directives = HashMap::new();

    for part in header.split(',') {
      let (name, value) = match part.split_once('=') {
        Some((name, value)) => (name, Some(value.trim().to_string())),
        None => (part, None),
      };

      let name = name.trim().to_lowercase();
      if !name.is_empty() {
        directives.insert(name, value);
      }
    }

    Self { directives }
  }

  pub fn contains(&self, name: &str) -> bool {
    self.directives.contains_key(name)
  }

  /// Value of a directive, `None` if it is absent or has no value.
  pub fn value(&self, name: &str) -> Option<&str> {
    self.directives.get(name).and_then(|v| v.as_deref())
  }
}

/// Whether a response may be cached, and for how long.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
  pub cacheable: bool,
  /// Seconds to keep the response; 0 when not cacheable.
  pub ttl_seconds: i64,
}

impl CachePolicy {
  pub const NOT_CACHEABLE: Self = Self {
    cacheable: false,
    ttl_seconds: 0,
  };

  /// Decide cacheability from a raw `Cache-Control` header value.
  pub fn from_header(header: &str) -> Self {
    if header.trim().is_empty() {
      return Self::NOT_CACHEABLE;
    }
    Self::from_directives(&CacheDirectives::parse(header))
  }

  /// Blocking directives are checked before `max-age`, so
  /// `no-store, max-age=60` is never cacheable.
  pub fn from_directives(directives: &CacheDirectives) -> Self {
    if UNCACHEABLE_DIRECTIVES
      .iter()
      .any(|name| directives.contains(name))
    {
      return Self::NOT_CACHEABLE;
    }

    match directives.value("max-age").and_then(parse_numeric) {
      Some(max_age) if max_age > 0 => Self {
        cacheable: true,
        ttl_seconds: max_age,
      },
      _ => Self::NOT_CACHEABLE,
    }
  }
}

/// Parse a numeric directive value: an integer, or a finite decimal
/// truncated toward zero (`"1e3"` is 1000, `"2.9"` is 2).
fn parse_numeric(value: &str) -> Option<i64> {
  if let Ok(n) = value.parse::<i64>() {
    return Some(n);
  }

  value
    .parse::<f64>()
    .ok()
    .filter(|n| n.is_finite())
    .map(|n| n.trunc() as i64)
}
