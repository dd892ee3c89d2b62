//! Identity, session and auth-event types.
//!
//! An [`Identity`] is the authenticated subject independent of any
//! role-specific data; the role lives on the
//! [`Profile`](crate::profile::Profile).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The externally-issued subject behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:         Uuid,
  /// Absent for identities created through phone one-time-code sign-in.
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub created_at: DateTime<Utc>,
}

/// A live token pair for an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub access_token:  String,
  pub refresh_token: String,
  pub expires_at:    DateTime<Utc>,
  pub identity:      Identity,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }

  /// Whether `other` carries the same access token as `self`.
  pub fn same_token(&self, other: &Session) -> bool {
    self.access_token == other.access_token
  }
}

/// Email + password pair used for sign-up and password sign-in.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl Credentials {
  pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
    Self { email: email.into(), password: password.into() }
  }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("email", &self.email)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Result of a sign-up call.
///
/// `session` is `None` when the backend requires the address to be confirmed
/// before the new identity may sign in.
#[derive(Debug, Clone)]
pub struct Registration {
  pub identity: Identity,
  pub session:  Option<Session>,
}

// ─── Auth events ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
  SignedIn,
  SignedOut,
  TokenRefreshed,
  UserUpdated,
}

/// A push notification that the backend's current session changed.
#[derive(Debug, Clone)]
pub struct AuthEvent {
  pub kind:    AuthEventKind,
  pub session: Option<Session>,
}

impl AuthEvent {
  pub fn signed_in(session: Session) -> Self {
    Self { kind: AuthEventKind::SignedIn, session: Some(session) }
  }

  pub fn signed_out() -> Self {
    Self { kind: AuthEventKind::SignedOut, session: None }
  }

  pub fn refreshed(session: Session) -> Self {
    Self { kind: AuthEventKind::TokenRefreshed, session: Some(session) }
  }
}
