use thiserror::Error;

/// Maximum length for error response bodies kept in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failure of a single remote operation.
///
/// `Clone` because one in-flight result is handed to every caller that
/// joined the same memoized request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
  #[error("Transport error: {0}")]
  Transport(String),

  #[error("Server returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("Malformed response: {0}")]
  Malformed(String),

  #[error("Request was cancelled")]
  Cancelled,
}

impl FetchError {
  /// Truncate a response body to avoid logging excessive data
  fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
      return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
      end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
  }

  pub fn from_status(status: u16, body: &str) -> Self {
    FetchError::Status {
      status,
      body: Self::truncate_body(body),
    }
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      FetchError::Malformed(e.to_string())
    } else {
      FetchError::Transport(e.to_string())
    }
  }
}

impl From<serde_json::Error> for FetchError {
  fn from(e: serde_json::Error) -> Self {
    FetchError::Malformed(e.to_string())
  }
}
