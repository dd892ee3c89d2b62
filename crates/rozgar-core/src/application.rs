//! Applications: one per (job, applicant) pair.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review state of an application. Any status may follow any other.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  Pending,
  Reviewed,
  Shortlisted,
  Rejected,
  Hired,
}

impl ApplicationStatus {
  pub const ALL: [ApplicationStatus; 5] = [
    Self::Pending,
    Self::Reviewed,
    Self::Shortlisted,
    Self::Rejected,
    Self::Hired,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Reviewed => "reviewed",
      Self::Shortlisted => "shortlisted",
      Self::Rejected => "rejected",
      Self::Hired => "hired",
    }
  }

  /// The status after this one in [`ApplicationStatus::ALL`], wrapping.
  pub fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }
}

impl fmt::Display for ApplicationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ApplicationStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|st| st.as_str() == s)
      .ok_or_else(|| format!("unknown application status: {s:?}"))
  }
}

/// An `applications` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
  pub id:               Uuid,
  pub job_id:           Uuid,
  pub user_id:          Uuid,
  pub status:           ApplicationStatus,
  pub cover_letter:     Option<String>,
  pub resume_url:       Option<String>,
  pub additional_notes: Option<String>,
  pub applied_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// Job fields joined onto an application (`jobs:job_id`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
  pub title:     String,
  pub company:   String,
  pub salary:    String,
  pub posted_by: Option<Uuid>,
}

/// Applicant fields joined onto an application (`profiles:user_id`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantSummary {
  pub full_name:        Option<String>,
  pub email:            Option<String>,
  pub phone:            Option<String>,
  #[serde(default)]
  pub skills:           Vec<String>,
  pub experience_years: Option<i32>,
}

/// An application as returned by a list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
  #[serde(flatten)]
  pub application: Application,
  #[serde(rename = "jobs", default)]
  pub job:         Option<JobSummary>,
  #[serde(rename = "profiles", default)]
  pub applicant:   Option<ApplicantSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
  pub job_id:           Uuid,
  pub user_id:          Uuid,
  pub cover_letter:     Option<String>,
  pub resume_url:       Option<String>,
  pub additional_notes: Option<String>,
}

impl NewApplication {
  pub fn new(job_id: Uuid, user_id: Uuid) -> Self {
    Self {
      job_id,
      user_id,
      cover_letter: None,
      resume_url: None,
      additional_notes: None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status:           Option<ApplicationStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub additional_notes: Option<String>,
}

/// Filters for listing applications. All present filters are ANDed; results
/// are ordered by `applied_at`, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationQuery {
  /// Applications made by this identity.
  pub user_id:     Option<Uuid>,
  pub job_id:      Option<Uuid>,
  /// Applications to postings made by this identity.
  pub employer_id: Option<Uuid>,
}

impl ApplicationQuery {
  pub fn by_applicant(user_id: Uuid) -> Self {
    Self { user_id: Some(user_id), ..Self::default() }
  }

  pub fn for_employer(employer_id: Uuid) -> Self {
    Self { employer_id: Some(employer_id), ..Self::default() }
  }

  pub fn for_job(job_id: Uuid) -> Self {
    Self { job_id: Some(job_id), ..Self::default() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_next_wraps() {
    assert_eq!(ApplicationStatus::Pending.next(), ApplicationStatus::Reviewed);
    assert_eq!(ApplicationStatus::Hired.next(), ApplicationStatus::Pending);
  }

  #[test]
  fn record_deserialises_embedded_joins() {
    let json = serde_json::json!({
      "id": "6f1c2f5e-8a7b-4c3d-9e10-0a1b2c3d4e5f",
      "job_id": "7f1c2f5e-8a7b-4c3d-9e10-0a1b2c3d4e5f",
      "user_id": "8f1c2f5e-8a7b-4c3d-9e10-0a1b2c3d4e5f",
      "status": "shortlisted",
      "cover_letter": null,
      "resume_url": null,
      "additional_notes": null,
      "applied_at": "2024-01-15T10:00:00Z",
      "updated_at": "2024-01-15T10:00:00Z",
      "jobs": {
        "title": "Software Developer",
        "company": "ABC Technologies",
        "salary": "₹8-12 LPA",
        "posted_by": null
      },
      "profiles": { "full_name": "राम शर्मा", "email": "ram@example.com" }
    });

    let record: ApplicationRecord = serde_json::from_value(json).unwrap();
    assert_eq!(record.application.status, ApplicationStatus::Shortlisted);
    assert_eq!(record.job.unwrap().company, "ABC Technologies");
    let applicant = record.applicant.unwrap();
    assert_eq!(applicant.full_name.as_deref(), Some("राम शर्मा"));
    assert!(applicant.skills.is_empty());
  }
}
