//! Mapping from HTTP outcomes to [`rozgar_core::Error`].

use reqwest::StatusCode;
use rozgar_core::Error;

use crate::wire::WireError;

/// A failed round-trip, before it is interpreted for a particular call.
#[derive(Debug)]
pub enum Failure {
  Transport(reqwest::Error),
  Status { status: StatusCode, code: Option<String>, message: String },
}

impl Failure {
  pub fn from_body(status: StatusCode, body: &str) -> Self {
    let wire: WireError = serde_json::from_str(body).unwrap_or_default();
    let message = wire
      .message()
      .map(str::to_owned)
      .unwrap_or_else(|| body.trim().to_owned());
    Self::Status { status, code: wire.code(), message }
  }

  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Status { status, .. } => Some(*status),
      Self::Transport(_) => None,
    }
  }

  /// Whether the server answered with a client error other than rate
  /// limiting.
  pub fn is_refusal(&self) -> bool {
    self.status().is_some_and(|s| s.is_client_error() && s != StatusCode::TOO_MANY_REQUESTS)
  }

  pub fn mentions(&self, needle: &str) -> bool {
    match self {
      Self::Status { code, message, .. } => {
        code.as_deref() == Some(needle) || message.to_lowercase().contains(needle)
      }
      Self::Transport(_) => false,
    }
  }
}

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl From<Failure> for Error {
  fn from(failure: Failure) -> Self {
    match failure {
      Failure::Transport(err) if err.is_decode() => {
        Error::Storage(format!("unexpected response body: {err}"))
      }
      Failure::Transport(err) => Error::Unavailable(err.to_string()),
      Failure::Status { status, code, message } => {
        if status == StatusCode::CONFLICT || code.as_deref() == Some(UNIQUE_VIOLATION) {
          return Error::Conflict(message);
        }
        match status {
          StatusCode::UNAUTHORIZED => Error::NotAuthenticated,
          StatusCode::BAD_GATEWAY
          | StatusCode::SERVICE_UNAVAILABLE
          | StatusCode::GATEWAY_TIMEOUT => Error::Unavailable(message),
          _ => Error::Rejected { status: status.as_u16(), message },
        }
      }
    }
  }
}
