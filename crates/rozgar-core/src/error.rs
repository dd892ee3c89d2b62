//! Error types for `rozgar-core`.
//!
//! Every backend maps its native failures into [`Error`] so the client layer
//! can tell "no such row" and "bad password" apart from a dead network.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("invalid or expired one-time code")]
  InvalidCode,

  #[error("an account already exists for {0}")]
  EmailTaken(String),

  #[error("not signed in")]
  NotAuthenticated,

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  /// A uniqueness constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  /// The backend could not be reached, or the transport failed mid-request.
  #[error("backend unavailable: {0}")]
  Unavailable(String),

  /// The backend answered, but refused the request.
  #[error("backend rejected request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("storage error: {0}")]
  Storage(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    Self::NotFound { entity, id: id.to_string() }
  }

  /// Whether the failure came from the transport rather than from the
  /// request itself.
  pub fn is_transport(&self) -> bool {
    matches!(self, Self::Unavailable(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
