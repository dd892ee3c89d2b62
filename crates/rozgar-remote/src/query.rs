//! PostgREST query-string construction.
//!
//! Every function returns `(key, value)` pairs for
//! [`reqwest::RequestBuilder::query`], which takes care of URL encoding.

use rozgar_core::{application::ApplicationQuery, job::JobQuery};
use uuid::Uuid;

pub type Params = Vec<(String, String)>;

const JOB_SELECT: &str = "*,profiles:posted_by(full_name,company_name)";

const APPLICANT_EMBED: &str = "profiles:user_id(full_name,email,phone,skills,experience_years)";

const JOB_EMBED_FIELDS: &str = "(title,company,salary,posted_by)";

pub fn eq(column: &str, value: impl std::fmt::Display) -> (String, String) {
  (column.to_owned(), format!("eq.{value}"))
}

/// Quote a term for use inside an `or=(...)` list, where `,` `.` `:` and
/// parentheses are reserved.
fn quoted(term: &str) -> String {
  let escaped = term.replace('\\', "\\\\").replace('"', "\\\"");
  format!("\"{escaped}\"")
}

pub fn by_id(id: Uuid) -> Params { vec![eq("id", id)] }

pub fn single(mut params: Params) -> Params {
  params.push(("limit".into(), "1".into()));
  params
}

pub fn jobs(query: &JobQuery) -> Params {
  let mut params = vec![("select".to_owned(), JOB_SELECT.to_owned())];

  if let Some(status) = query.status {
    params.push(eq("status", status));
  }
  if let Some(term) = query.search_term() {
    let pattern = quoted(&format!("*{term}*"));
    params.push((
      "or".into(),
      format!("(title.ilike.{pattern},company.ilike.{pattern},description.ilike.{pattern})"),
    ));
  }
  if let Some(term) = query.location_term() {
    params.push(("location".into(), format!("ilike.*{term}*")));
  }
  if let Some(job_type) = query.job_type {
    params.push(eq("job_type", job_type));
  }
  if let Some(owner) = query.posted_by {
    params.push(eq("posted_by", owner));
  }

  params.push(("order".into(), "created_at.desc".into()));
  params
}

pub fn applications(query: &ApplicationQuery) -> Params {
  // Filtering on an embedded column needs an inner join, or PostgREST
  // returns every row with a null embed instead.
  let job_embed = if query.employer_id.is_some() {
    format!("jobs:job_id!inner{JOB_EMBED_FIELDS}")
  } else {
    format!("jobs:job_id{JOB_EMBED_FIELDS}")
  };
  let mut params = vec![("select".to_owned(), format!("*,{job_embed},{APPLICANT_EMBED}"))];

  if let Some(user_id) = query.user_id {
    params.push(eq("user_id", user_id));
  }
  if let Some(job_id) = query.job_id {
    params.push(eq("job_id", job_id));
  }
  if let Some(employer_id) = query.employer_id {
    params.push(eq("jobs.posted_by", employer_id));
  }

  params.push(("order".into(), "applied_at.desc".into()));
  params
}

pub fn application_pair(job_id: Uuid, user_id: Uuid) -> Params {
  single(vec![eq("job_id", job_id), eq("user_id", user_id)])
}

pub fn active_grant(user_id: Uuid) -> Params {
  single(vec![eq("user_id", user_id), eq("is_active", true)])
}

#[cfg(test)]
mod tests {
  use rozgar_core::job::{JobStatus, JobType};

  use super::*;

  fn get<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  #[test]
  fn default_job_query_filters_active_and_orders() {
    let params = jobs(&JobQuery::default());
    assert_eq!(get(&params, "status"), Some("eq.active"));
    assert_eq!(get(&params, "order"), Some("created_at.desc"));
    assert_eq!(get(&params, "select"), Some(JOB_SELECT));
    assert!(get(&params, "or").is_none());
  }

  #[test]
  fn search_spans_three_columns() {
    let params = jobs(&JobQuery::default().with_search("developer"));
    assert_eq!(
      get(&params, "or"),
      Some(
        "(title.ilike.\"*developer*\",company.ilike.\"*developer*\",\
         description.ilike.\"*developer*\")"
      )
    );
  }

  #[test]
  fn reserved_characters_are_quoted() {
    let params = jobs(&JobQuery::default().with_search("a,b \"c\""));
    let or = get(&params, "or").unwrap();
    assert!(or.starts_with("(title.ilike.\"*a,b \\\"c\\\"*\","));
  }

  #[test]
  fn blank_filters_are_ignored() {
    let query = JobQuery {
      search: Some("   ".into()),
      location: Some("".into()),
      ..JobQuery::default()
    };
    let params = jobs(&query);
    assert!(get(&params, "or").is_none());
    assert!(get(&params, "location").is_none());
  }

  #[test]
  fn exact_filters_and_all_statuses() {
    let owner = Uuid::nil();
    let query = JobQuery {
      job_type: Some(JobType::Internship),
      location: Some("Pune".into()),
      ..JobQuery::owned_by(owner)
    };
    let params = jobs(&query);
    assert!(get(&params, "status").is_none());
    assert_eq!(get(&params, "job_type"), Some("eq.Internship"));
    assert_eq!(get(&params, "location"), Some("ilike.*Pune*"));
    assert_eq!(get(&params, "posted_by"), Some(format!("eq.{owner}").as_str()));

    let closed = JobQuery { status: Some(JobStatus::Closed), ..JobQuery::everything() };
    assert_eq!(get(&jobs(&closed), "status"), Some("eq.closed"));
  }

  #[test]
  fn employer_filter_uses_inner_join() {
    let employer = Uuid::nil();
    let params = applications(&ApplicationQuery::for_employer(employer));
    let select = get(&params, "select").unwrap();
    assert!(select.contains("jobs:job_id!inner(title,company,salary,posted_by)"));
    assert_eq!(get(&params, "jobs.posted_by"), Some(format!("eq.{employer}").as_str()));
    assert_eq!(get(&params, "order"), Some("applied_at.desc"));

    let params = applications(&ApplicationQuery::by_applicant(employer));
    assert!(!get(&params, "select").unwrap().contains("!inner"));
  }
}
