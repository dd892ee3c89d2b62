//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 strings (microseconds, `Z`) so that
//! lexical order equals chronological order. List fields are JSON arrays.
//! UUIDs are hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use rozgar_core::{
  admin::{AdminGrant, AdminLevel},
  application::{
    ApplicantSummary, Application, ApplicationRecord, ApplicationStatus,
    JobSummary,
  },
  identity::Identity,
  job::{JobListing, JobPosting, JobStatus, JobType, PosterSummary},
  profile::{Profile, UserType},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// The current time at the precision the columns store.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

fn decode_enum<T: FromStr<Err = String>>(s: &str) -> Result<T> {
  s.parse().map_err(Error::Decode)
}

/// Escape a user-supplied term for a `LIKE ... ESCAPE '\'` pattern and wrap
/// it for substring matching.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str = "p.id, p.email, p.full_name, p.phone, p.user_type,
  p.company_name, p.location, p.bio, p.skills, p.experience_years, p.education,
  p.resume_url, p.profile_image_url, p.is_verified, p.is_active, p.created_at,
  p.updated_at";

pub const JOB_COLUMNS: &str = "j.id, j.title, j.company, j.location, j.salary,
  j.salary_min, j.salary_max, j.job_type, j.experience, j.skills, j.description,
  j.requirements, j.benefits, j.posted_by, j.status, j.application_deadline,
  j.remote_work_allowed, j.views_count, j.applications_count, j.created_at,
  j.updated_at";

pub const APPLICATION_COLUMNS: &str = "a.id, a.job_id, a.user_id, a.status,
  a.cover_letter, a.resume_url, a.additional_notes, a.applied_at, a.updated_at";

pub const GRANT_COLUMNS: &str = "g.id, g.user_id, g.admin_level, g.permissions,
  g.created_by, g.created_at, g.is_active";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read from a `users` row.
pub struct RawIdentity {
  pub user_id:    String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub created_at: String,
}

impl RawIdentity {
  /// Reads `user_id, email, phone, created_at` starting at column 0.
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      email:      row.get(1)?,
      phone:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      id:         decode_uuid(&self.user_id)?,
      email:      self.email,
      phone:      self.phone,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawProfile {
  pub id:                String,
  pub email:             String,
  pub full_name:         String,
  pub phone:             Option<String>,
  pub user_type:         String,
  pub company_name:      Option<String>,
  pub location:          Option<String>,
  pub bio:               Option<String>,
  pub skills:            String,
  pub experience_years:  Option<i32>,
  pub education:         Option<String>,
  pub resume_url:        Option<String>,
  pub profile_image_url: Option<String>,
  pub is_verified:       bool,
  pub is_active:         bool,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawProfile {
  /// Reads the columns of [`PROFILE_COLUMNS`], in order.
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      email:             row.get(1)?,
      full_name:         row.get(2)?,
      phone:             row.get(3)?,
      user_type:         row.get(4)?,
      company_name:      row.get(5)?,
      location:          row.get(6)?,
      bio:               row.get(7)?,
      skills:            row.get(8)?,
      experience_years:  row.get(9)?,
      education:         row.get(10)?,
      resume_url:        row.get(11)?,
      profile_image_url: row.get(12)?,
      is_verified:       row.get(13)?,
      is_active:         row.get(14)?,
      created_at:        row.get(15)?,
      updated_at:        row.get(16)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      id:                decode_uuid(&self.id)?,
      email:             self.email,
      full_name:         self.full_name,
      phone:             self.phone,
      user_type:         decode_enum::<UserType>(&self.user_type)?,
      company_name:      self.company_name,
      location:          self.location,
      bio:               self.bio,
      skills:            decode_list(&self.skills)?,
      experience_years:  self.experience_years,
      education:         self.education,
      resume_url:        self.resume_url,
      profile_image_url: self.profile_image_url,
      is_verified:       self.is_verified,
      is_active:         self.is_active,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawGrant {
  pub id:          String,
  pub user_id:     String,
  pub admin_level: String,
  pub permissions: String,
  pub created_by:  Option<String>,
  pub created_at:  String,
  pub is_active:   bool,
}

impl RawGrant {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      user_id:     row.get(1)?,
      admin_level: row.get(2)?,
      permissions: row.get(3)?,
      created_by:  row.get(4)?,
      created_at:  row.get(5)?,
      is_active:   row.get(6)?,
    })
  }

  pub fn into_grant(self) -> Result<AdminGrant> {
    Ok(AdminGrant {
      id:          decode_uuid(&self.id)?,
      user_id:     decode_uuid(&self.user_id)?,
      admin_level: decode_enum::<AdminLevel>(&self.admin_level)?,
      permissions: decode_list(&self.permissions)?,
      created_by:  self.created_by.as_deref().map(decode_uuid).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      is_active:   self.is_active,
    })
  }
}

pub struct RawJob {
  pub id:                   String,
  pub title:                String,
  pub company:              String,
  pub location:             String,
  pub salary:               String,
  pub salary_min:           Option<i64>,
  pub salary_max:           Option<i64>,
  pub job_type:             String,
  pub experience:           Option<String>,
  pub skills:               String,
  pub description:          String,
  pub requirements:         String,
  pub benefits:             String,
  pub posted_by:            String,
  pub status:               String,
  pub application_deadline: Option<String>,
  pub remote_work_allowed:  bool,
  pub views_count:          i64,
  pub applications_count:   i64,
  pub created_at:           String,
  pub updated_at:           String,
}

/// Number of columns in [`JOB_COLUMNS`].
pub const JOB_COLUMN_COUNT: usize = 21;

impl RawJob {
  /// Reads the columns of [`JOB_COLUMNS`], in order.
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get(0)?,
      title:                row.get(1)?,
      company:              row.get(2)?,
      location:             row.get(3)?,
      salary:               row.get(4)?,
      salary_min:           row.get(5)?,
      salary_max:           row.get(6)?,
      job_type:             row.get(7)?,
      experience:           row.get(8)?,
      skills:               row.get(9)?,
      description:          row.get(10)?,
      requirements:         row.get(11)?,
      benefits:             row.get(12)?,
      posted_by:            row.get(13)?,
      status:               row.get(14)?,
      application_deadline: row.get(15)?,
      remote_work_allowed:  row.get(16)?,
      views_count:          row.get(17)?,
      applications_count:   row.get(18)?,
      created_at:           row.get(19)?,
      updated_at:           row.get(20)?,
    })
  }

  pub fn into_job(self) -> Result<JobPosting> {
    Ok(JobPosting {
      id:                   decode_uuid(&self.id)?,
      title:                self.title,
      company:              self.company,
      location:             self.location,
      salary:               self.salary,
      salary_min:           self.salary_min,
      salary_max:           self.salary_max,
      job_type:             decode_enum::<JobType>(&self.job_type)?,
      experience:           self.experience,
      skills:               decode_list(&self.skills)?,
      description:          self.description,
      requirements:         decode_list(&self.requirements)?,
      benefits:             decode_list(&self.benefits)?,
      posted_by:            decode_uuid(&self.posted_by)?,
      status:               decode_enum::<JobStatus>(&self.status)?,
      application_deadline: self
        .application_deadline
        .as_deref()
        .map(decode_date)
        .transpose()?,
      remote_work_allowed:  self.remote_work_allowed,
      views_count:          self.views_count,
      applications_count:   self.applications_count,
      created_at:           decode_dt(&self.created_at)?,
      updated_at:           decode_dt(&self.updated_at)?,
    })
  }
}

/// A job row followed by the poster's `full_name, company_name` (both NULL
/// when the poster has no profile).
pub struct RawJobListing {
  pub job:                 RawJob,
  pub poster_full_name:    Option<String>,
  pub poster_company_name: Option<String>,
  pub poster_has_profile:  bool,
}

impl RawJobListing {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let n = JOB_COLUMN_COUNT;
    Ok(Self {
      job:                 RawJob::read(row)?,
      poster_full_name:    row.get(n)?,
      poster_company_name: row.get(n + 1)?,
      poster_has_profile:  row.get(n + 2)?,
    })
  }

  pub fn into_listing(self) -> Result<JobListing> {
    let poster = self.poster_has_profile.then(|| PosterSummary {
      full_name:    self.poster_full_name,
      company_name: self.poster_company_name,
    });
    Ok(JobListing { job: self.job.into_job()?, poster })
  }
}

pub struct RawApplication {
  pub id:               String,
  pub job_id:           String,
  pub user_id:          String,
  pub status:           String,
  pub cover_letter:     Option<String>,
  pub resume_url:       Option<String>,
  pub additional_notes: Option<String>,
  pub applied_at:       String,
  pub updated_at:       String,
}

/// Number of columns in [`APPLICATION_COLUMNS`].
pub const APPLICATION_COLUMN_COUNT: usize = 9;

impl RawApplication {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      job_id:           row.get(1)?,
      user_id:          row.get(2)?,
      status:           row.get(3)?,
      cover_letter:     row.get(4)?,
      resume_url:       row.get(5)?,
      additional_notes: row.get(6)?,
      applied_at:       row.get(7)?,
      updated_at:       row.get(8)?,
    })
  }

  pub fn into_application(self) -> Result<Application> {
    Ok(Application {
      id:               decode_uuid(&self.id)?,
      job_id:           decode_uuid(&self.job_id)?,
      user_id:          decode_uuid(&self.user_id)?,
      status:           decode_enum::<ApplicationStatus>(&self.status)?,
      cover_letter:     self.cover_letter,
      resume_url:       self.resume_url,
      additional_notes: self.additional_notes,
      applied_at:       decode_dt(&self.applied_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// An application row followed by the job summary
/// (`title, company, salary, posted_by`) and the applicant summary
/// (`full_name, email, phone, skills, experience_years, has_profile`).
pub struct RawApplicationRecord {
  pub application:      RawApplication,
  pub job_title:        String,
  pub job_company:      String,
  pub job_salary:       String,
  pub job_posted_by:    String,
  pub full_name:        Option<String>,
  pub email:            Option<String>,
  pub phone:            Option<String>,
  pub skills:           Option<String>,
  pub experience_years: Option<i32>,
  pub has_profile:      bool,
}

impl RawApplicationRecord {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let n = APPLICATION_COLUMN_COUNT;
    Ok(Self {
      application:      RawApplication::read(row)?,
      job_title:        row.get(n)?,
      job_company:      row.get(n + 1)?,
      job_salary:       row.get(n + 2)?,
      job_posted_by:    row.get(n + 3)?,
      full_name:        row.get(n + 4)?,
      email:            row.get(n + 5)?,
      phone:            row.get(n + 6)?,
      skills:           row.get(n + 7)?,
      experience_years: row.get(n + 8)?,
      has_profile:      row.get(n + 9)?,
    })
  }

  pub fn into_record(self) -> Result<ApplicationRecord> {
    let job = JobSummary {
      title:     self.job_title,
      company:   self.job_company,
      salary:    self.job_salary,
      posted_by: Some(decode_uuid(&self.job_posted_by)?),
    };
    let applicant = if self.has_profile {
      Some(ApplicantSummary {
        full_name:        self.full_name,
        email:            self.email,
        phone:            self.phone,
        skills:           self.skills.as_deref().map(decode_list).transpose()?.unwrap_or_default(),
        experience_years: self.experience_years,
      })
    } else {
      None
    };
    Ok(ApplicationRecord {
      application: self.application.into_application()?,
      job: Some(job),
      applicant,
    })
  }
}
