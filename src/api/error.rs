//! Error types for the REST API client.

/// Reasons a fetch from the API can fail.
///
/// The messages are the ones shown to users once the model turns a
/// failure into error data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  /// The HTTP call produced no response.
  #[error("no reply from server")]
  Transport(#[source] reqwest::Error),

  /// The server answered with a status other than 200.
  #[error("server replied with an error")]
  UnexpectedStatus { status: u16 },

  /// The body is not strict JSON, or not a list of objects.
  #[error("server replied with invalid format")]
  InvalidBody(#[source] serde_json::Error),
}
