//! Job postings and the query used to list them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Enums ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
  #[serde(rename = "Full-time")]
  FullTime,
  #[serde(rename = "Part-time")]
  PartTime,
  #[serde(rename = "Contract")]
  Contract,
  #[serde(rename = "Internship")]
  Internship,
}

impl JobType {
  pub const ALL: [JobType; 4] =
    [Self::FullTime, Self::PartTime, Self::Contract, Self::Internship];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::FullTime => "Full-time",
      Self::PartTime => "Part-time",
      Self::Contract => "Contract",
      Self::Internship => "Internship",
    }
  }
}

impl fmt::Display for JobType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for JobType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| format!("unknown job type: {s:?}"))
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
  #[default]
  Active,
  Inactive,
  Closed,
}

impl JobStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
      Self::Closed => "closed",
    }
  }

  /// The next status in the `active → inactive → closed → active` cycle.
  pub fn cycle(self) -> Self {
    match self {
      Self::Active => Self::Inactive,
      Self::Inactive => Self::Closed,
      Self::Closed => Self::Active,
    }
  }
}

impl fmt::Display for JobStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for JobStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "inactive" => Ok(Self::Inactive),
      "closed" => Ok(Self::Closed),
      other => Err(format!("unknown job status: {other:?}")),
    }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A `jobs` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
  pub id:                   Uuid,
  pub title:                String,
  pub company:              String,
  pub location:             String,
  pub salary:               String,
  pub salary_min:           Option<i64>,
  pub salary_max:           Option<i64>,
  pub job_type:             JobType,
  pub experience:           Option<String>,
  #[serde(default)]
  pub skills:               Vec<String>,
  pub description:          String,
  #[serde(default)]
  pub requirements:         Vec<String>,
  #[serde(default)]
  pub benefits:             Vec<String>,
  pub posted_by:            Uuid,
  pub status:               JobStatus,
  pub application_deadline: Option<NaiveDate>,
  #[serde(default)]
  pub remote_work_allowed:  bool,
  #[serde(default)]
  pub views_count:          i64,
  #[serde(default)]
  pub applications_count:   i64,
  pub created_at:           DateTime<Utc>,
  pub updated_at:           DateTime<Utc>,
}

/// The poster's display fields, joined from `profiles` on `posted_by`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosterSummary {
  pub full_name:    Option<String>,
  pub company_name: Option<String>,
}

/// A posting as returned by a list query: the row plus its poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
  #[serde(flatten)]
  pub job:    JobPosting,
  #[serde(rename = "profiles", default)]
  pub poster: Option<PosterSummary>,
}

/// Input for a new posting. Status starts at [`JobStatus::Active`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
  pub title:                String,
  pub company:              String,
  pub location:             String,
  pub salary:               String,
  pub salary_min:           Option<i64>,
  pub salary_max:           Option<i64>,
  pub job_type:             JobType,
  pub experience:           Option<String>,
  pub skills:               Vec<String>,
  pub description:          String,
  pub requirements:         Vec<String>,
  pub benefits:             Vec<String>,
  pub posted_by:            Uuid,
  pub application_deadline: Option<NaiveDate>,
  pub remote_work_allowed:  bool,
}

/// Partial update of a posting. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title:                Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub company:              Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location:             Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub salary:               Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub job_type:             Option<JobType>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub experience:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub skills:               Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status:               Option<JobStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub application_deadline: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub remote_work_allowed:  Option<bool>,
}

impl JobPatch {
  pub fn status(status: JobStatus) -> Self {
    Self { status: Some(status), ..Self::default() }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters for listing postings. All present filters are ANDed; results are
/// ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
  /// Case-insensitive substring over title, company and description.
  pub search:    Option<String>,
  /// Case-insensitive substring over location.
  pub location:  Option<String>,
  pub job_type:  Option<JobType>,
  pub posted_by: Option<Uuid>,
  /// `None` lists every status.
  pub status:    Option<JobStatus>,
}

impl Default for JobQuery {
  /// Only active postings.
  fn default() -> Self {
    Self {
      search:    None,
      location:  None,
      job_type:  None,
      posted_by: None,
      status:    Some(JobStatus::Active),
    }
  }
}

impl JobQuery {
  /// Every posting made by `owner`, whatever its status.
  pub fn owned_by(owner: Uuid) -> Self {
    Self { posted_by: Some(owner), status: None, ..Self::default() }
  }

  /// Every posting on the board, whatever its status.
  pub fn everything() -> Self { Self { status: None, ..Self::default() } }

  pub fn with_search(mut self, text: impl Into<String>) -> Self {
    self.search = Some(text.into());
    self
  }

  /// Blank filters count as absent.
  pub fn search_term(&self) -> Option<&str> {
    self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  pub fn location_term(&self) -> Option<&str> {
    self.location.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }
}
