//! Error type for `rozgar-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rozgar_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column held a value this build does not know.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("password hash error: {0}")]
  PasswordHash(String),
}

impl Error {
  fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _)
      )) if e.code == ErrorCode::ConstraintViolation
    )
  }
}

impl From<Error> for rozgar_core::Error {
  fn from(err: Error) -> Self {
    if err.is_constraint_violation() {
      return rozgar_core::Error::Conflict(err.to_string());
    }
    match err {
      Error::Core(inner) => inner,
      Error::Json(e) => rozgar_core::Error::Serialization(e),
      other => rozgar_core::Error::Storage(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
