//! Role-specific profile rows.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the board a profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
  #[serde(rename = "jobseeker")]
  JobSeeker,
  #[serde(rename = "employer")]
  Employer,
}

impl UserType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::JobSeeker => "jobseeker",
      Self::Employer => "employer",
    }
  }
}

impl fmt::Display for UserType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for UserType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "jobseeker" => Ok(Self::JobSeeker),
      "employer" => Ok(Self::Employer),
      other => Err(format!("unknown user type: {other:?}")),
    }
  }
}

/// A `profiles` row. `id` equals the owning identity's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub id:                Uuid,
  pub email:             String,
  pub full_name:         String,
  pub phone:             Option<String>,
  pub user_type:         UserType,
  pub company_name:      Option<String>,
  pub location:          Option<String>,
  pub bio:               Option<String>,
  #[serde(default)]
  pub skills:            Vec<String>,
  pub experience_years:  Option<i32>,
  pub education:         Option<String>,
  pub resume_url:        Option<String>,
  pub profile_image_url: Option<String>,
  #[serde(default)]
  pub is_verified:       bool,
  #[serde(default = "default_true")]
  pub is_active:         bool,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

fn default_true() -> bool { true }

/// Input for creating the profile row that accompanies a sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
  pub id:           Uuid,
  pub email:        String,
  pub full_name:    String,
  pub phone:        Option<String>,
  pub user_type:    UserType,
  pub company_name: Option<String>,
  pub location:     Option<String>,
}

/// Partial update of a profile. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub full_name:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:             Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub company_name:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio:               Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub skills:            Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub experience_years:  Option<i32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub education:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resume_url:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile_image_url: Option<String>,
}

impl ProfilePatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}
