//! The result type every user-facing operation returns.

use thiserror::Error;

use crate::session::Role;

#[derive(Debug, Error)]
pub enum Failure {
  /// Input rejected before anything was sent.
  #[error("invalid {field}: {reason}")]
  Validation { field: &'static str, reason: &'static str },

  #[error("already applied to this job")]
  AlreadyApplied,

  #[error("not signed in")]
  NotSignedIn,

  /// The credentials are good but belong to a different kind of account.
  #[error("account is not registered as {expected:?}")]
  WrongRole { expected: Role },

  #[error(transparent)]
  Backend(#[from] rozgar_core::Error),
}

impl Failure {
  pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
    Self::Validation { field, reason }
  }

  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation { .. }) }
}

pub type Outcome<T> = Result<T, Failure>;

// ─── Field checks ────────────────────────────────────────────────────────────

pub(crate) fn required(field: &'static str, value: &str) -> Outcome<()> {
  if value.trim().is_empty() {
    return Err(Failure::invalid(field, "required"));
  }
  Ok(())
}

pub(crate) fn email(value: &str) -> Outcome<()> {
  required("email", value)?;
  let value = value.trim();
  match value.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
      Ok(())
    }
    _ => Err(Failure::invalid("email", "malformed address")),
  }
}

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn new_password(value: &str) -> Outcome<()> {
  if value.chars().count() < MIN_PASSWORD_LEN {
    return Err(Failure::invalid("password", "too short"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_shapes() {
    assert!(email("ram@example.com").is_ok());
    assert!(email("  sita@example.com ").is_ok());
    for bad in ["", "   ", "ram", "@example.com", "ram@", "a@b@c"] {
      assert!(email(bad).unwrap_err().is_validation(), "{bad:?}");
    }
  }

  #[test]
  fn password_length_counts_characters() {
    assert!(new_password("12345").is_err());
    assert!(new_password("123456").is_ok());
    assert!(new_password("पासवर्ड").is_ok());
  }
}
