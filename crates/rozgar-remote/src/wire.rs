//! GoTrue and PostgREST payloads that have no core counterpart.

use chrono::{DateTime, Duration, Utc};
use rozgar_core::identity::{Identity, Session};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Auth ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct WireUser {
  pub id:         Uuid,
  #[serde(default)]
  pub email:      Option<String>,
  #[serde(default)]
  pub phone:      Option<String>,
  pub created_at: DateTime<Utc>,
}

/// GoTrue reports missing contact fields as empty strings.
fn present(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

impl WireUser {
  pub fn into_identity(self) -> Identity {
    Identity {
      id:         self.id,
      email:      present(self.email),
      phone:      present(self.phone),
      created_at: self.created_at,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct WireSession {
  pub access_token:  String,
  pub refresh_token: String,
  pub expires_in:    i64,
  /// Unix seconds. Older servers omit it.
  #[serde(default)]
  pub expires_at:    Option<i64>,
  pub user:          WireUser,
}

impl WireSession {
  pub fn into_session(self, received_at: DateTime<Utc>) -> Session {
    let expires_at = self
      .expires_at
      .and_then(|secs| DateTime::from_timestamp(secs, 0))
      .unwrap_or_else(|| received_at + Duration::seconds(self.expires_in));
    Session {
      access_token: self.access_token,
      refresh_token: self.refresh_token,
      expires_at,
      identity: self.user.into_identity(),
    }
  }
}

/// `/signup` answers with a session when auto-confirm is on, and with the
/// bare user when the address must be confirmed first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
  Session(WireSession),
  User(WireUser),
}

#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
  pub email:    &'a str,
  pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
  pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct OtpRequest<'a> {
  pub phone: &'a str,
}

#[derive(Debug, Serialize)]
pub struct OtpVerify<'a> {
  #[serde(rename = "type")]
  pub kind:  &'static str,
  pub phone: &'a str,
  pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Recover<'a> {
  pub email: &'a str,
}

// ─── Rest ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ViewsCall {
  pub job_id: Uuid,
}

/// Error body. GoTrue and PostgREST each use a different subset of these
/// fields.
#[derive(Debug, Default, Deserialize)]
pub struct WireError {
  #[serde(default)]
  pub code:              Option<serde_json::Value>,
  #[serde(default)]
  pub error_code:        Option<String>,
  #[serde(default)]
  pub error:             Option<String>,
  #[serde(default)]
  pub error_description: Option<String>,
  #[serde(default)]
  pub msg:               Option<String>,
  #[serde(default)]
  pub message:           Option<String>,
}

impl WireError {
  pub fn message(&self) -> Option<&str> {
    self
      .message
      .as_deref()
      .or(self.msg.as_deref())
      .or(self.error_description.as_deref())
      .or(self.error.as_deref())
  }

  /// The machine-readable code, whichever field carried it.
  pub fn code(&self) -> Option<String> {
    if let Some(code) = &self.error_code {
      return Some(code.clone());
    }
    match &self.code {
      Some(serde_json::Value::String(s)) => Some(s.clone()),
      _ => self.error.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn session_uses_server_expiry_when_present() {
    let body = serde_json::json!({
      "access_token": "a",
      "refresh_token": "r",
      "expires_in": 3600,
      "expires_at": 1_700_000_000,
      "token_type": "bearer",
      "user": {
        "id": "6c0c3ef1-7f1b-4a5e-9bc4-2f0d1a7c9e11",
        "email": "ram@example.com",
        "phone": "",
        "created_at": "2024-01-01T00:00:00Z"
      }
    });
    let wire: WireSession = serde_json::from_value(body).unwrap();
    let session = wire.into_session(Utc::now());
    assert_eq!(session.expires_at.timestamp(), 1_700_000_000);
    assert_eq!(session.identity.email.as_deref(), Some("ram@example.com"));
    assert_eq!(session.identity.phone, None);
  }

  #[test]
  fn session_expiry_falls_back_to_lifetime() {
    let body = serde_json::json!({
      "access_token": "a",
      "refresh_token": "r",
      "expires_in": 60,
      "user": {
        "id": "6c0c3ef1-7f1b-4a5e-9bc4-2f0d1a7c9e11",
        "created_at": "2024-01-01T00:00:00Z"
      }
    });
    let received = Utc::now();
    let session = serde_json::from_value::<WireSession>(body)
      .unwrap()
      .into_session(received);
    assert_eq!(session.expires_at, received + Duration::seconds(60));
  }

  #[test]
  fn signup_response_variants() {
    let user = serde_json::json!({
      "id": "6c0c3ef1-7f1b-4a5e-9bc4-2f0d1a7c9e11",
      "email": "sita@example.com",
      "created_at": "2024-01-01T00:00:00Z"
    });
    assert!(matches!(
      serde_json::from_value(user).unwrap(),
      SignUpResponse::User(_)
    ));
  }

  #[test]
  fn error_fields_are_merged() {
    let gotrue: WireError = serde_json::from_value(serde_json::json!({
      "error": "invalid_grant",
      "error_description": "Invalid login credentials"
    }))
    .unwrap();
    assert_eq!(gotrue.code().as_deref(), Some("invalid_grant"));
    assert_eq!(gotrue.message(), Some("Invalid login credentials"));

    let postgrest: WireError = serde_json::from_value(serde_json::json!({
      "code": "23505",
      "message": "duplicate key value violates unique constraint",
      "details": null,
      "hint": null
    }))
    .unwrap();
    assert_eq!(postgrest.code().as_deref(), Some("23505"));
  }
}
