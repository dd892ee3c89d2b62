//! Administrative grants (`admin_users`), independent of profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
  SuperAdmin,
  Admin,
  Moderator,
}

impl AdminLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::SuperAdmin => "super_admin",
      Self::Admin => "admin",
      Self::Moderator => "moderator",
    }
  }
}

impl std::str::FromStr for AdminLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "super_admin" => Ok(Self::SuperAdmin),
      "admin" => Ok(Self::Admin),
      "moderator" => Ok(Self::Moderator),
      other => Err(format!("unknown admin level: {other:?}")),
    }
  }
}

/// A row conferring elevated privilege on an identity. Only grants with
/// `is_active` set count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminGrant {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub admin_level: AdminLevel,
  #[serde(default)]
  pub permissions: Vec<String>,
  pub created_by:  Option<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub is_active:   bool,
}
