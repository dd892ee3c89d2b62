//! [`Tables`] over the PostgREST endpoints.

use chrono::Utc;
use reqwest::Method;
use rozgar_core::{
  Error, Result, Tables,
  admin::AdminGrant,
  application::{
    Application, ApplicationPatch, ApplicationQuery, ApplicationRecord,
    ApplicationStatus, NewApplication,
  },
  job::{JobListing, JobPatch, JobPosting, JobQuery, JobStatus, NewJob},
  profile::{NewProfile, Profile, ProfilePatch},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::{
  client::RemoteBackend,
  query::{self, Params},
  wire::ViewsCall,
};

/// Serialise `body` and set extra columns on the resulting object.
fn with_fields<T: Serialize>(body: &T, extra: &[(&str, Value)]) -> Result<Value> {
  let mut value = serde_json::to_value(body)?;
  if let Value::Object(map) = &mut value {
    for (key, v) in extra {
      map.insert((*key).to_owned(), v.clone());
    }
  }
  Ok(value)
}

fn now_value() -> Value { Value::String(Utc::now().to_rfc3339()) }

fn first<T>(rows: Vec<T>, entity: &'static str, id: Uuid) -> Result<T> {
  rows.into_iter().next().ok_or_else(|| Error::not_found(entity, id))
}

impl RemoteBackend {
  fn table_path(table: &str) -> String { format!("/rest/v1/{table}") }

  async fn select<T: DeserializeOwned>(&self, table: &str, params: &Params) -> Result<Vec<T>> {
    let bearer = self.bearer().await;
    let request = self
      .request(Method::GET, &Self::table_path(table), &bearer)
      .query(params);
    Ok(self.send_json(request).await?)
  }

  /// A write that asks for the affected rows back.
  async fn write<T: DeserializeOwned>(
    &self,
    method: Method,
    table: &str,
    params: &Params,
    body: Option<&Value>,
  ) -> Result<Vec<T>> {
    let bearer = self.bearer().await;
    let mut request = self
      .request(method, &Self::table_path(table), &bearer)
      .header("Prefer", "return=representation")
      .query(params);
    if let Some(body) = body {
      request = request.json(body);
    }
    Ok(self.send_json(request).await?)
  }

  async fn insert<T: DeserializeOwned>(&self, table: &str, body: &Value) -> Result<T> {
    let rows: Vec<T> = self.write(Method::POST, table, &Params::new(), Some(body)).await?;
    rows
      .into_iter()
      .next()
      .ok_or_else(|| Error::Storage(format!("insert into {table} returned no row")))
  }
}

impl Tables for RemoteBackend {
  // ── Profiles ──────────────────────────────────────────────────────────

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let rows = self.select("profiles", &query::single(query::by_id(id))).await?;
    Ok(rows.into_iter().next())
  }

  async fn insert_profile(&self, profile: NewProfile) -> Result<Profile> {
    let body = serde_json::to_value(&profile)?;
    self.insert("profiles", &body).await
  }

  async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<Profile> {
    let body = with_fields(&patch, &[("updated_at", now_value())])?;
    let rows = self
      .write(Method::PATCH, "profiles", &query::by_id(id), Some(&body))
      .await?;
    first(rows, "profile", id)
  }

  // ── Admin grants ──────────────────────────────────────────────────────

  async fn active_admin_grant(&self, user_id: Uuid) -> Result<Option<AdminGrant>> {
    let rows = self.select("admin_users", &query::active_grant(user_id)).await?;
    Ok(rows.into_iter().next())
  }

  // ── Jobs ──────────────────────────────────────────────────────────────

  async fn list_jobs<'a>(&'a self, query: &'a JobQuery) -> Result<Vec<JobListing>> {
    self.select("jobs", &query::jobs(query)).await
  }

  async fn insert_job(&self, job: NewJob) -> Result<JobPosting> {
    let body = with_fields(&job, &[("status", Value::from(JobStatus::Active.as_str()))])?;
    self.insert("jobs", &body).await
  }

  async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<JobPosting> {
    let body = with_fields(&patch, &[("updated_at", now_value())])?;
    let rows = self
      .write(Method::PATCH, "jobs", &query::by_id(id), Some(&body))
      .await?;
    first(rows, "job", id)
  }

  async fn delete_job(&self, id: Uuid) -> Result<()> {
    let rows: Vec<Value> = self.write(Method::DELETE, "jobs", &query::by_id(id), None).await?;
    first(rows, "job", id).map(drop)
  }

  async fn increment_job_views(&self, id: Uuid) -> Result<()> {
    let bearer = self.bearer().await;
    let request = self
      .request(Method::POST, "/rest/v1/rpc/increment_job_views", &bearer)
      .json(&ViewsCall { job_id: id });
    self.send(request).await?;
    Ok(())
  }

  // ── Applications ──────────────────────────────────────────────────────

  async fn list_applications<'a>(
    &'a self,
    query: &'a ApplicationQuery,
  ) -> Result<Vec<ApplicationRecord>> {
    self.select("applications", &query::applications(query)).await
  }

  async fn find_application(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Application>> {
    let rows = self
      .select("applications", &query::application_pair(job_id, user_id))
      .await?;
    Ok(rows.into_iter().next())
  }

  async fn insert_application(&self, application: NewApplication) -> Result<Application> {
    let body = with_fields(
      &application,
      &[("status", Value::from(ApplicationStatus::Pending.as_str()))],
    )?;
    self.insert("applications", &body).await
  }

  async fn update_application(&self, id: Uuid, patch: ApplicationPatch) -> Result<Application> {
    let body = with_fields(&patch, &[("updated_at", now_value())])?;
    let rows = self
      .write(Method::PATCH, "applications", &query::by_id(id), Some(&body))
      .await?;
    first(rows, "application", id)
  }

  async fn delete_application(&self, id: Uuid) -> Result<()> {
    let rows: Vec<Value> = self
      .write(Method::DELETE, "applications", &query::by_id(id), None)
      .await?;
    first(rows, "application", id).map(drop)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extra_fields_are_merged_into_the_body() {
    let patch = JobPatch::status(JobStatus::Inactive);
    let body = with_fields(&patch, &[("updated_at", Value::from("t"))]).unwrap();
    assert_eq!(body, serde_json::json!({ "status": "inactive", "updated_at": "t" }));
  }

  #[test]
  fn empty_result_is_not_found() {
    let err = first(Vec::<Value>::new(), "job", Uuid::nil()).unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "job", .. }));
  }
}
