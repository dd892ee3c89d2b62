//! [`Tables`] for [`SqliteBackend`]: profiles, admin grants, jobs and
//! applications.

use rozgar_core::{
  Tables,
  admin::{AdminGrant, AdminLevel},
  application::{
    Application, ApplicationPatch, ApplicationQuery, ApplicationRecord,
    ApplicationStatus, NewApplication,
  },
  job::{JobListing, JobPatch, JobPosting, JobQuery, JobStatus, NewJob},
  profile::{NewProfile, Profile, ProfilePatch},
};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  Result,
  backend::SqliteBackend,
  encode::{
    APPLICATION_COLUMNS, GRANT_COLUMNS, JOB_COLUMNS, PROFILE_COLUMNS,
    RawApplication, RawApplicationRecord, RawGrant, RawJob, RawJobListing,
    RawProfile, encode_date, encode_dt, encode_list, encode_uuid, like_pattern, now,
  },
};

type CoreResult<T> = rozgar_core::Result<T>;

// ─── SQL builders ────────────────────────────────────────────────────────────

/// `SET` clause for a partial update, accumulated column by column.
#[derive(Default)]
struct Assignments {
  columns: Vec<&'static str>,
  values:  Vec<Value>,
}

impl Assignments {
  fn set(&mut self, column: &'static str, value: Option<impl Into<Value>>) {
    if let Some(v) = value {
      self.columns.push(column);
      self.values.push(v.into());
    }
  }

  /// Build `UPDATE <table> SET ... WHERE <key> = ?`, always touching
  /// `updated_at`. The key value is appended last.
  fn into_update(
    mut self,
    table: &str,
    key: &str,
    key_value: String,
  ) -> (String, Vec<Value>) {
    self.columns.push("updated_at");
    self.values.push(Value::Text(encode_dt(now())));
    let set = self
      .columns
      .iter()
      .map(|c| format!("{c} = ?"))
      .collect::<Vec<_>>()
      .join(", ");
    self.values.push(Value::Text(key_value));
    (format!("UPDATE {table} SET {set} WHERE {key} = ?"), self.values)
  }
}

/// `WHERE` clause accumulated condition by condition, ANDed.
#[derive(Default)]
struct Conditions {
  clauses: Vec<&'static str>,
  values:  Vec<Value>,
}

impl Conditions {
  fn push(&mut self, clause: &'static str, values: impl IntoIterator<Item = Value>) {
    self.clauses.push(clause);
    self.values.extend(values);
  }

  fn where_clause(&self) -> String {
    if self.clauses.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.clauses.join(" AND "))
    }
  }
}

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

fn list_value(items: Option<Vec<String>>) -> Result<Option<String>> {
  items.as_deref().map(encode_list).transpose()
}

fn not_found(entity: &'static str, id: Uuid) -> crate::Error {
  crate::Error::Core(rozgar_core::Error::not_found(entity, id))
}

// ─── Inherent row helpers ────────────────────────────────────────────────────

impl SqliteBackend {
  async fn profile_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawProfile::read)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn job_by_id(&self, id: Uuid) -> Result<Option<JobPosting>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawJob> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs j WHERE j.id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawJob::read)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawJob::into_job).transpose()
  }

  async fn application_by_id(&self, id: Uuid) -> Result<Option<Application>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawApplication::read)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawApplication::into_application).transpose()
  }

  /// Run an `UPDATE` and return how many rows it touched.
  async fn execute_update(&self, sql: String, values: Vec<Value>) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(values))?))
      .await?;
    Ok(changed)
  }

  /// Record an active administrative grant for `user_id`.
  pub async fn grant_admin(
    &self,
    user_id: Uuid,
    level: AdminLevel,
    created_by: Option<Uuid>,
  ) -> CoreResult<AdminGrant> {
    let grant = AdminGrant {
      id: Uuid::new_v4(),
      user_id,
      admin_level: level,
      permissions: Vec::new(),
      created_by,
      created_at: now(),
      is_active: true,
    };

    let id_str = encode_uuid(grant.id);
    let user_str = encode_uuid(user_id);
    let level_str = level.as_str();
    let by_str = created_by.map(encode_uuid);
    let at_str = encode_dt(grant.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO admin_users (id, user_id, admin_level, created_by, created_at, is_active)
           VALUES (?1, ?2, ?3, ?4, ?5, 1)",
          rusqlite::params![id_str, user_str, level_str, by_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(crate::Error::from)?;

    Ok(grant)
  }

  /// Deactivate every grant held by `user_id`.
  pub async fn revoke_admin(&self, user_id: Uuid) -> CoreResult<()> {
    let user_str = encode_uuid(user_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE admin_users SET is_active = 0 WHERE user_id = ?1",
          rusqlite::params![user_str],
        )?;
        Ok(())
      })
      .await
      .map_err(crate::Error::from)?;
    Ok(())
  }
}

// ─── Tables impl ─────────────────────────────────────────────────────────────

impl Tables for SqliteBackend {
  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, id: Uuid) -> CoreResult<Option<Profile>> {
    Ok(self.profile_by_id(id).await?)
  }

  async fn insert_profile(&self, input: NewProfile) -> CoreResult<Profile> {
    let now = now();
    let profile = Profile {
      id:                input.id,
      email:             input.email,
      full_name:         input.full_name,
      phone:             input.phone,
      user_type:         input.user_type,
      company_name:      input.company_name,
      location:          input.location,
      bio:               None,
      skills:            Vec::new(),
      experience_years:  None,
      education:         None,
      resume_url:        None,
      profile_image_url: None,
      is_verified:       false,
      is_active:         true,
      created_at:        now,
      updated_at:        now,
    };

    let id_str = encode_uuid(profile.id);
    let email = profile.email.clone();
    let full_name = profile.full_name.clone();
    let phone = profile.phone.clone();
    let user_type = profile.user_type.as_str();
    let company = profile.company_name.clone();
    let location = profile.location.clone();
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             id, email, full_name, phone, user_type, company_name, location,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![id_str, email, full_name, phone, user_type, company, location, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(crate::Error::from)?;

    Ok(profile)
  }

  async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> CoreResult<Profile> {
    let mut set = Assignments::default();
    set.set("full_name", patch.full_name);
    set.set("phone", patch.phone);
    set.set("company_name", patch.company_name);
    set.set("location", patch.location);
    set.set("bio", patch.bio);
    set.set("skills", list_value(patch.skills)?);
    set.set("experience_years", patch.experience_years);
    set.set("education", patch.education);
    set.set("resume_url", patch.resume_url);
    set.set("profile_image_url", patch.profile_image_url);

    let (sql, values) = set.into_update("profiles", "id", encode_uuid(id));
    if self.execute_update(sql, values).await? == 0 {
      return Err(not_found("profile", id).into());
    }
    self
      .profile_by_id(id)
      .await?
      .ok_or_else(|| rozgar_core::Error::not_found("profile", id))
  }

  // ── Admin grants ──────────────────────────────────────────────────────────

  async fn active_admin_grant(&self, user_id: Uuid) -> CoreResult<Option<AdminGrant>> {
    let user_str = encode_uuid(user_id);
    let raw: Option<RawGrant> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {GRANT_COLUMNS} FROM admin_users g
           WHERE g.user_id = ?1 AND g.is_active = 1
           ORDER BY g.created_at LIMIT 1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![user_str], RawGrant::read)
            .optional()?,
        )
      })
      .await
      .map_err(crate::Error::from)?;
    Ok(raw.map(RawGrant::into_grant).transpose()?)
  }

  // ── Jobs ──────────────────────────────────────────────────────────────────

  async fn list_jobs<'a>(&'a self, query: &'a JobQuery) -> CoreResult<Vec<JobListing>> {
    let mut conds = Conditions::default();
    if let Some(term) = query.search_term() {
      let pattern = like_pattern(term);
      conds.push(
        "(j.title LIKE ? ESCAPE '\\' OR j.company LIKE ? ESCAPE '\\' \
         OR j.description LIKE ? ESCAPE '\\')",
        [text(pattern.clone()), text(pattern.clone()), text(pattern)],
      );
    }
    if let Some(term) = query.location_term() {
      conds.push("j.location LIKE ? ESCAPE '\\'", [text(like_pattern(term))]);
    }
    if let Some(job_type) = query.job_type {
      conds.push("j.job_type = ?", [text(job_type.as_str())]);
    }
    if let Some(owner) = query.posted_by {
      conds.push("j.posted_by = ?", [text(encode_uuid(owner))]);
    }
    if let Some(status) = query.status {
      conds.push("j.status = ?", [text(status.as_str())]);
    }

    let sql = format!(
      "SELECT {JOB_COLUMNS}, p.full_name, p.company_name, p.id IS NOT NULL
       FROM jobs j
       LEFT JOIN profiles p ON p.id = j.posted_by
       {}
       ORDER BY j.created_at DESC, j.rowid DESC",
      conds.where_clause()
    );
    let values = conds.values;

    let raws: Vec<RawJobListing> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values), RawJobListing::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(crate::Error::from)?;

    Ok(
      raws
        .into_iter()
        .map(RawJobListing::into_listing)
        .collect::<Result<Vec<_>>>()?,
    )
  }

  async fn insert_job(&self, input: NewJob) -> CoreResult<JobPosting> {
    let now = now();
    let job = JobPosting {
      id:                   Uuid::new_v4(),
      title:                input.title,
      company:              input.company,
      location:             input.location,
      salary:               input.salary,
      salary_min:           input.salary_min,
      salary_max:           input.salary_max,
      job_type:             input.job_type,
      experience:           input.experience,
      skills:               input.skills,
      description:          input.description,
      requirements:         input.requirements,
      benefits:             input.benefits,
      posted_by:            input.posted_by,
      status:               JobStatus::Active,
      application_deadline: input.application_deadline,
      remote_work_allowed:  input.remote_work_allowed,
      views_count:          0,
      applications_count:   0,
      created_at:           now,
      updated_at:           now,
    };

    let values: Vec<Value> = vec![
      text(encode_uuid(job.id)),
      text(job.title.clone()),
      text(job.company.clone()),
      text(job.location.clone()),
      text(job.salary.clone()),
      job.salary_min.into(),
      job.salary_max.into(),
      text(job.job_type.as_str()),
      job.experience.clone().into(),
      text(encode_list(&job.skills)?),
      text(job.description.clone()),
      text(encode_list(&job.requirements)?),
      text(encode_list(&job.benefits)?),
      text(encode_uuid(job.posted_by)),
      text(job.status.as_str()),
      job.application_deadline.map(encode_date).into(),
      job.remote_work_allowed.into(),
      text(encode_dt(now)),
    ];

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO jobs (
             id, title, company, location, salary, salary_min, salary_max,
             job_type, experience, skills, description, requirements, benefits,
             posted_by, status, application_deadline, remote_work_allowed,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?18)",
          rusqlite::params_from_iter(values),
        )?;
        Ok(())
      })
      .await
      .map_err(crate::Error::from)?;

    Ok(job)
  }

  async fn update_job(&self, id: Uuid, patch: JobPatch) -> CoreResult<JobPosting> {
    let mut set = Assignments::default();
    set.set("title", patch.title);
    set.set("company", patch.company);
    set.set("location", patch.location);
    set.set("salary", patch.salary);
    set.set("job_type", patch.job_type.map(|t| t.as_str().to_owned()));
    set.set("experience", patch.experience);
    set.set("skills", list_value(patch.skills)?);
    set.set("description", patch.description);
    set.set("status", patch.status.map(|s| s.as_str().to_owned()));
    set.set("application_deadline", patch.application_deadline.map(encode_date));
    set.set("remote_work_allowed", patch.remote_work_allowed);

    let (sql, values) = set.into_update("jobs", "id", encode_uuid(id));
    if self.execute_update(sql, values).await? == 0 {
      return Err(not_found("job", id).into());
    }
    self
      .job_by_id(id)
      .await?
      .ok_or_else(|| rozgar_core::Error::not_found("job", id))
  }

  async fn delete_job(&self, id: Uuid) -> CoreResult<()> {
    let sql = "DELETE FROM jobs WHERE id = ?".to_owned();
    if self.execute_update(sql, vec![text(encode_uuid(id))]).await? == 0 {
      return Err(not_found("job", id).into());
    }
    Ok(())
  }

  async fn increment_job_views(&self, id: Uuid) -> CoreResult<()> {
    let sql = "UPDATE jobs SET views_count = views_count + 1 WHERE id = ?".to_owned();
    if self.execute_update(sql, vec![text(encode_uuid(id))]).await? == 0 {
      return Err(not_found("job", id).into());
    }
    Ok(())
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn list_applications<'a>(
    &'a self,
    query: &'a ApplicationQuery,
  ) -> CoreResult<Vec<ApplicationRecord>> {
    let mut conds = Conditions::default();
    if let Some(user_id) = query.user_id {
      conds.push("a.user_id = ?", [text(encode_uuid(user_id))]);
    }
    if let Some(job_id) = query.job_id {
      conds.push("a.job_id = ?", [text(encode_uuid(job_id))]);
    }
    if let Some(employer_id) = query.employer_id {
      conds.push("j.posted_by = ?", [text(encode_uuid(employer_id))]);
    }

    let sql = format!(
      "SELECT {APPLICATION_COLUMNS},
              j.title, j.company, j.salary, j.posted_by,
              p.full_name, p.email, p.phone, p.skills, p.experience_years,
              p.id IS NOT NULL
       FROM applications a
       JOIN jobs j ON j.id = a.job_id
       LEFT JOIN profiles p ON p.id = a.user_id
       {}
       ORDER BY a.applied_at DESC, a.rowid DESC",
      conds.where_clause()
    );
    let values = conds.values;

    let raws: Vec<RawApplicationRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values), RawApplicationRecord::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(crate::Error::from)?;

    Ok(
      raws
        .into_iter()
        .map(RawApplicationRecord::into_record)
        .collect::<Result<Vec<_>>>()?,
    )
  }

  async fn find_application(
    &self,
    job_id: Uuid,
    user_id: Uuid,
  ) -> CoreResult<Option<Application>> {
    let job_str = encode_uuid(job_id);
    let user_str = encode_uuid(user_id);
    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {APPLICATION_COLUMNS} FROM applications a
           WHERE a.job_id = ?1 AND a.user_id = ?2"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![job_str, user_str], RawApplication::read)
            .optional()?,
        )
      })
      .await
      .map_err(crate::Error::from)?;
    Ok(raw.map(RawApplication::into_application).transpose()?)
  }

  async fn insert_application(&self, input: NewApplication) -> CoreResult<Application> {
    let now = now();
    let application = Application {
      id:               Uuid::new_v4(),
      job_id:           input.job_id,
      user_id:          input.user_id,
      status:           ApplicationStatus::Pending,
      cover_letter:     input.cover_letter,
      resume_url:       input.resume_url,
      additional_notes: input.additional_notes,
      applied_at:       now,
      updated_at:       now,
    };

    let id_str = encode_uuid(application.id);
    let job_str = encode_uuid(application.job_id);
    let user_str = encode_uuid(application.user_id);
    let status = application.status.as_str();
    let cover = application.cover_letter.clone();
    let resume = application.resume_url.clone();
    let notes = application.additional_notes.clone();
    let at_str = encode_dt(now);

    let job_exists: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row("SELECT 1 FROM jobs WHERE id = ?1", rusqlite::params![job_str], |_| Ok(true))
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO applications (
             id, job_id, user_id, status, cover_letter, resume_url,
             additional_notes, applied_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![id_str, job_str, user_str, status, cover, resume, notes, at_str],
        )?;
        tx.execute(
          "UPDATE jobs SET applications_count = applications_count + 1 WHERE id = ?1",
          rusqlite::params![job_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await
      .map_err(crate::Error::from)?;

    if !job_exists {
      return Err(rozgar_core::Error::not_found("job", application.job_id));
    }
    Ok(application)
  }

  async fn update_application(
    &self,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> CoreResult<Application> {
    let mut set = Assignments::default();
    set.set("status", patch.status.map(|s| s.as_str().to_owned()));
    set.set("additional_notes", patch.additional_notes);

    let (sql, values) = set.into_update("applications", "id", encode_uuid(id));
    if self.execute_update(sql, values).await? == 0 {
      return Err(not_found("application", id).into());
    }
    self
      .application_by_id(id)
      .await?
      .ok_or_else(|| rozgar_core::Error::not_found("application", id))
  }

  async fn delete_application(&self, id: Uuid) -> CoreResult<()> {
    let id_str = encode_uuid(id);
    let deleted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let job_id: Option<String> = tx
          .query_row(
            "DELETE FROM applications WHERE id = ?1 RETURNING job_id",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(job_id) = job_id else {
          return Ok(false);
        };
        tx.execute(
          "UPDATE jobs SET applications_count = MAX(applications_count - 1, 0) WHERE id = ?1",
          rusqlite::params![job_id],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await
      .map_err(crate::Error::from)?;

    if !deleted {
      return Err(rozgar_core::Error::not_found("application", id));
    }
    Ok(())
  }
}
