//! Integration tests for `SqliteBackend` against an in-memory database.

use std::sync::{Arc, Mutex};

use rozgar_core::{
  AuthBackend, Error, Tables,
  admin::AdminLevel,
  application::{ApplicationPatch, ApplicationQuery, ApplicationStatus, NewApplication},
  identity::{AuthEventKind, Credentials},
  job::{JobPatch, JobQuery, JobStatus, JobType, NewJob},
  profile::{NewProfile, ProfilePatch, UserType},
};
use uuid::Uuid;

use crate::{CodeSender, SqliteBackend, backend::MAX_CODE_ATTEMPTS};

async fn backend() -> SqliteBackend {
  SqliteBackend::open_in_memory()
    .await
    .expect("in-memory backend")
}

async fn seeded() -> SqliteBackend {
  let b = backend().await;
  assert!(b.seed_demo().await.unwrap());
  b
}

/// Keeps every secret handed to it.
#[derive(Default)]
struct Capture {
  otps:   Mutex<Vec<(String, String)>>,
  resets: Mutex<Vec<(String, String)>>,
}

impl CodeSender for Capture {
  fn send_otp(&self, phone: &str, code: &str) {
    self.otps.lock().unwrap().push((phone.into(), code.into()));
  }

  fn send_reset(&self, email: &str, token: &str) {
    self.resets.lock().unwrap().push((email.into(), token.into()));
  }
}

async fn sign_up(b: &SqliteBackend, email: &str) -> Uuid {
  b.sign_up(Credentials::new(email, "secret123"))
    .await
    .unwrap()
    .identity
    .id
}

fn job(posted_by: Uuid, title: &str, location: &str) -> NewJob {
  NewJob {
    title: title.into(),
    company: "Acme".into(),
    location: location.into(),
    salary: "₹5 LPA".into(),
    salary_min: None,
    salary_max: None,
    job_type: JobType::FullTime,
    experience: None,
    skills: vec!["Rust".into()],
    description: "Write software".into(),
    requirements: vec![],
    benefits: vec![],
    posted_by,
    application_deadline: None,
    remote_work_allowed: false,
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_then_sign_in() {
  let b = backend().await;
  let reg = b
    .sign_up(Credentials::new("Asha@Example.com ", "secret123"))
    .await
    .unwrap();
  assert_eq!(reg.identity.email.as_deref(), Some("asha@example.com"));
  assert!(reg.session.is_some());

  let session = b
    .sign_in_with_password(Credentials::new("asha@example.com", "secret123"))
    .await
    .unwrap();
  assert_eq!(session.identity.id, reg.identity.id);
  assert_eq!(b.current_session().await, Some(session));
}

#[tokio::test]
async fn sign_up_duplicate_email_is_rejected() {
  let b = backend().await;
  sign_up(&b, "asha@example.com").await;
  let err = b
    .sign_up(Credentials::new("ASHA@example.com", "other-pass"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_invalid_credentials() {
  let b = seeded().await;

  let err = b
    .sign_in_with_password(Credentials::new("ram@example.com", "nope"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));

  let err = b
    .sign_in_with_password(Credentials::new("ghost@example.com", "password123"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));
  assert!(b.current_session().await.is_none());
}

#[tokio::test]
async fn sign_in_and_out_publish_events() {
  let b = seeded().await;
  let mut events = b.subscribe();

  let session = b
    .sign_in_with_password(Credentials::new("ram@example.com", "password123"))
    .await
    .unwrap();
  let event = events.recv().await.unwrap();
  assert_eq!(event.kind, AuthEventKind::SignedIn);
  assert_eq!(event.session.as_ref().map(|s| s.identity.id), Some(session.identity.id));

  b.sign_out().await.unwrap();
  let event = events.recv().await.unwrap();
  assert_eq!(event.kind, AuthEventKind::SignedOut);
  assert!(event.session.is_none());
  assert!(b.current_session().await.is_none());

  // The old token no longer restores.
  assert!(b.restore_session(session).await.unwrap().is_none());
}

#[tokio::test]
async fn restore_valid_session_returns_it() {
  let b = seeded().await;
  let session = b
    .sign_in_with_password(Credentials::new("sita@example.com", "password123"))
    .await
    .unwrap();

  // A fresh process would start with no current session.
  b.set_current(None).await;

  let restored = b.restore_session(session.clone()).await.unwrap();
  assert_eq!(restored, Some(session.clone()));
  assert_eq!(b.current_session().await, Some(session));
}

#[tokio::test]
async fn restore_expired_session_rotates_tokens() {
  let b = seeded().await;
  let session = b
    .sign_in_with_password(Credentials::new("sita@example.com", "password123"))
    .await
    .unwrap();

  let access = session.access_token.clone();
  b.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE sessions SET expires_at = '2000-01-01T00:00:00.000000Z' WHERE access_token = ?1",
        rusqlite::params![access],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let refreshed = b.restore_session(session.clone()).await.unwrap().unwrap();
  assert_ne!(refreshed.access_token, session.access_token);
  assert_ne!(refreshed.refresh_token, session.refresh_token);
  assert_eq!(refreshed.identity.id, session.identity.id);

  // The old refresh token was consumed.
  assert!(b.restore_session(session).await.unwrap().is_none());
}

#[tokio::test]
async fn otp_flow_creates_phone_identity() {
  let capture = Arc::new(Capture::default());
  let b = backend().await.with_code_sender(capture.clone());

  b.request_otp("+91 98765 00000".into()).await.unwrap();
  let (phone, code) = capture.otps.lock().unwrap()[0].clone();
  assert_eq!(phone, "+919876500000");
  assert_eq!(code.len(), 6);

  let wrong = if code == "000000" { "111111" } else { "000000" };
  let err = b.verify_otp(phone.clone(), wrong.into()).await.unwrap_err();
  assert!(matches!(err, Error::InvalidCode));

  let session = b.verify_otp(phone.clone(), code.clone()).await.unwrap();
  assert_eq!(session.identity.phone.as_deref(), Some("+919876500000"));
  assert!(session.identity.email.is_none());

  // Codes are single use.
  let err = b.verify_otp(phone.clone(), code).await.unwrap_err();
  assert!(matches!(err, Error::InvalidCode));

  // A second round signs in the same identity.
  b.request_otp(phone.clone()).await.unwrap();
  let (_, code) = capture.otps.lock().unwrap()[1].clone();
  let again = b.verify_otp(phone, code).await.unwrap();
  assert_eq!(again.identity.id, session.identity.id);
}

#[tokio::test]
async fn wrong_guesses_burn_the_code() {
  let capture = Arc::new(Capture::default());
  let b = backend().await.with_code_sender(capture.clone());

  b.request_otp("+919876500000".into()).await.unwrap();
  let (phone, code) = capture.otps.lock().unwrap()[0].clone();
  let wrong = if code == "000000" { "111111" } else { "000000" };
  for _ in 0..MAX_CODE_ATTEMPTS {
    let err = b.verify_otp(phone.clone(), wrong.into()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidCode));
  }
  let err = b.verify_otp(phone.clone(), code).await.unwrap_err();
  assert!(matches!(err, Error::InvalidCode));

  // A new code starts with a clean count.
  b.request_otp(phone.clone()).await.unwrap();
  let (_, code) = capture.otps.lock().unwrap()[1].clone();
  for _ in 1..MAX_CODE_ATTEMPTS {
    let _ = b.verify_otp(phone.clone(), wrong.into()).await;
  }
  b.verify_otp(phone, code).await.unwrap();
}

#[tokio::test]
async fn version_one_file_gains_attempt_counts() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("rozgar.db");
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE otp_codes (
           phone      TEXT PRIMARY KEY,
           code_hash  TEXT NOT NULL,
           expires_at TEXT NOT NULL
         );
         PRAGMA user_version = 1;",
      )
      .unwrap();
  }

  let capture = Arc::new(Capture::default());
  let b = SqliteBackend::open(&path).await.unwrap().with_code_sender(capture.clone());
  b.request_otp("+919876500000".into()).await.unwrap();
  let (phone, code) = capture.otps.lock().unwrap()[0].clone();
  let wrong = if code == "000000" { "111111" } else { "000000" };
  assert!(b.verify_otp(phone.clone(), wrong.into()).await.is_err());
  b.verify_otp(phone, code).await.unwrap();
}

#[tokio::test]
async fn password_reset_replaces_password() {
  let capture = Arc::new(Capture::default());
  let b = backend().await.with_code_sender(capture.clone());
  sign_up(&b, "asha@example.com").await;

  b.request_password_reset("nobody@example.com".into()).await.unwrap();
  assert!(capture.resets.lock().unwrap().is_empty());

  b.request_password_reset("asha@example.com".into()).await.unwrap();
  let (_, token) = capture.resets.lock().unwrap()[0].clone();

  b.reset_password(&token, "brand-new-pass").await.unwrap();
  assert!(matches!(
    b.reset_password(&token, "again").await.unwrap_err(),
    Error::InvalidCode
  ));

  assert!(
    b.sign_in_with_password(Credentials::new("asha@example.com", "secret123"))
      .await
      .is_err()
  );
  b.sign_in_with_password(Credentials::new("asha@example.com", "brand-new-pass"))
    .await
    .unwrap();
}

// ─── Profiles and grants ─────────────────────────────────────────────────────

#[tokio::test]
async fn profile_roundtrip_and_patch() {
  let b = backend().await;
  let id = sign_up(&b, "asha@example.com").await;
  assert!(b.get_profile(id).await.unwrap().is_none());

  b.insert_profile(NewProfile {
    id,
    email: "asha@example.com".into(),
    full_name: "Asha".into(),
    phone: None,
    user_type: UserType::JobSeeker,
    company_name: None,
    location: Some("Patna".into()),
  })
  .await
  .unwrap();

  let updated = b
    .update_profile(id, ProfilePatch {
      skills: Some(vec!["Excel".into(), "Tally".into()]),
      experience_years: Some(3),
      ..ProfilePatch::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.skills, vec!["Excel".to_owned(), "Tally".to_owned()]);
  assert_eq!(updated.experience_years, Some(3));
  assert_eq!(updated.location.as_deref(), Some("Patna"));
  assert_eq!(b.get_profile(id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn update_missing_profile_is_not_found() {
  let b = backend().await;
  let err = b
    .update_profile(Uuid::new_v4(), ProfilePatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "profile", .. }));
}

#[tokio::test]
async fn only_active_grants_count() {
  let b = backend().await;
  let id = sign_up(&b, "boss@example.com").await;
  assert!(b.active_admin_grant(id).await.unwrap().is_none());

  b.grant_admin(id, AdminLevel::Moderator, None).await.unwrap();
  let grant = b.active_admin_grant(id).await.unwrap().unwrap();
  assert_eq!(grant.admin_level, AdminLevel::Moderator);

  b.revoke_admin(id).await.unwrap();
  assert!(b.active_admin_grant(id).await.unwrap().is_none());
}

#[tokio::test]
async fn seed_grants_admin_and_runs_once() {
  let b = seeded().await;
  assert!(!b.seed_demo().await.unwrap());

  let admin = b
    .sign_in_with_password(Credentials::new("admin@babadham.com", "admin123"))
    .await
    .unwrap();
  let grant = b.active_admin_grant(admin.identity.id).await.unwrap().unwrap();
  assert_eq!(grant.admin_level, AdminLevel::SuperAdmin);
  assert!(b.get_profile(admin.identity.id).await.unwrap().is_some());
}

// ─── Jobs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_matches_title_case_insensitively() {
  let b = seeded().await;
  let listings = b
    .list_jobs(&JobQuery::default().with_search("developer"))
    .await
    .unwrap();
  assert_eq!(listings.len(), 1);
  assert_eq!(listings[0].job.title, "Software Developer");

  let poster = listings[0].poster.clone().unwrap();
  assert_eq!(poster.company_name.as_deref(), Some("ABC Technologies"));
}

#[tokio::test]
async fn list_is_newest_first() {
  let b = seeded().await;
  let titles: Vec<_> = b
    .list_jobs(&JobQuery::default())
    .await
    .unwrap()
    .into_iter()
    .map(|l| l.job.title)
    .collect();
  assert_eq!(titles, ["Software Developer", "Marketing Manager"]);
}

#[tokio::test]
async fn filters_are_anded() {
  let b = backend().await;
  let owner = sign_up(&b, "hr@acme.example").await;
  b.insert_job(job(owner, "Rust Engineer", "Pune")).await.unwrap();
  b.insert_job(job(owner, "Rust Intern", "Delhi")).await.unwrap();
  let mut part_time = job(owner, "Go Engineer", "Pune");
  part_time.job_type = JobType::PartTime;
  b.insert_job(part_time).await.unwrap();

  let query = JobQuery {
    search: Some("rust".into()),
    location: Some("pune".into()),
    ..JobQuery::default()
  };
  let hits = b.list_jobs(&query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].job.title, "Rust Engineer");

  let query = JobQuery { job_type: Some(JobType::PartTime), ..JobQuery::default() };
  let hits = b.list_jobs(&query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].job.title, "Go Engineer");
  // The poster has no profile row.
  assert!(hits[0].poster.is_none());
}

#[tokio::test]
async fn search_wildcards_are_literal() {
  let b = seeded().await;
  let hits = b.list_jobs(&JobQuery::default().with_search("%")).await.unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn default_query_hides_inactive_postings() {
  let b = backend().await;
  let owner = sign_up(&b, "hr@acme.example").await;
  let posting = b.insert_job(job(owner, "Rust Engineer", "Pune")).await.unwrap();
  assert_eq!(posting.status, JobStatus::Active);

  let updated = b
    .update_job(posting.id, JobPatch::status(JobStatus::Closed))
    .await
    .unwrap();
  assert_eq!(updated.status, JobStatus::Closed);

  assert!(b.list_jobs(&JobQuery::default()).await.unwrap().is_empty());
  assert_eq!(b.list_jobs(&JobQuery::owned_by(owner)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_and_views() {
  let b = backend().await;
  let owner = sign_up(&b, "hr@acme.example").await;
  let posting = b.insert_job(job(owner, "Rust Engineer", "Pune")).await.unwrap();

  b.increment_job_views(posting.id).await.unwrap();
  b.increment_job_views(posting.id).await.unwrap();
  let listed = b.list_jobs(&JobQuery::default()).await.unwrap();
  assert_eq!(listed[0].job.views_count, 2);

  b.delete_job(posting.id).await.unwrap();
  assert!(matches!(
    b.delete_job(posting.id).await.unwrap_err(),
    Error::NotFound { .. }
  ));
  assert!(matches!(
    b.increment_job_views(posting.id).await.unwrap_err(),
    Error::NotFound { .. }
  ));
}

// ─── Applications ────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_application_conflicts_at_storage_level() {
  let b = backend().await;
  let owner = sign_up(&b, "hr@acme.example").await;
  let seeker = sign_up(&b, "asha@example.com").await;
  let posting = b.insert_job(job(owner, "Rust Engineer", "Pune")).await.unwrap();

  b.insert_application(NewApplication::new(posting.id, seeker)).await.unwrap();
  let err = b
    .insert_application(NewApplication::new(posting.id, seeker))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  let listed = b.list_jobs(&JobQuery::default()).await.unwrap();
  assert_eq!(listed[0].job.applications_count, 1);
}

#[tokio::test]
async fn apply_to_missing_job_is_not_found() {
  let b = backend().await;
  let seeker = sign_up(&b, "asha@example.com").await;
  let err = b
    .insert_application(NewApplication::new(Uuid::new_v4(), seeker))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "job", .. }));
}

#[tokio::test]
async fn list_applications_by_employer_and_applicant() {
  let b = seeded().await;
  let jobs = b.list_jobs(&JobQuery::default()).await.unwrap();
  let developer = jobs.iter().find(|l| l.job.title == "Software Developer").unwrap();
  let marketing = jobs.iter().find(|l| l.job.title == "Marketing Manager").unwrap();

  let ram = b
    .sign_in_with_password(Credentials::new("ram@example.com", "password123"))
    .await
    .unwrap()
    .identity
    .id;
  let sita = b
    .sign_in_with_password(Credentials::new("sita@example.com", "password123"))
    .await
    .unwrap()
    .identity
    .id;

  b.insert_application(NewApplication::new(developer.job.id, ram)).await.unwrap();
  b.insert_application(NewApplication::new(marketing.job.id, ram)).await.unwrap();
  b.insert_application(NewApplication::new(developer.job.id, sita)).await.unwrap();

  let mine = b.list_applications(&ApplicationQuery::by_applicant(ram)).await.unwrap();
  assert_eq!(mine.len(), 2);
  // Newest first.
  assert_eq!(mine[0].job.as_ref().unwrap().title, "Marketing Manager");

  let abc = developer.job.posted_by;
  let incoming = b.list_applications(&ApplicationQuery::for_employer(abc)).await.unwrap();
  assert_eq!(incoming.len(), 2);
  assert!(incoming.iter().all(|r| r.application.job_id == developer.job.id));
  let names: Vec<_> = incoming
    .iter()
    .filter_map(|r| r.applicant.as_ref()?.full_name.clone())
    .collect();
  assert_eq!(names, ["सीता देवी", "राम शर्मा"]);

  let both = ApplicationQuery { user_id: Some(ram), employer_id: Some(abc), job_id: None };
  assert_eq!(b.list_applications(&both).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_and_delete_application() {
  let b = backend().await;
  let owner = sign_up(&b, "hr@acme.example").await;
  let seeker = sign_up(&b, "asha@example.com").await;
  let posting = b.insert_job(job(owner, "Rust Engineer", "Pune")).await.unwrap();
  let app = b
    .insert_application(NewApplication::new(posting.id, seeker))
    .await
    .unwrap();
  assert_eq!(app.status, ApplicationStatus::Pending);

  let updated = b
    .update_application(app.id, ApplicationPatch {
      status: Some(ApplicationStatus::Hired),
      additional_notes: None,
    })
    .await
    .unwrap();
  assert_eq!(updated.status, ApplicationStatus::Hired);

  // Free-form transitions.
  let back = b
    .update_application(app.id, ApplicationPatch {
      status: Some(ApplicationStatus::Pending),
      additional_notes: Some("second look".into()),
    })
    .await
    .unwrap();
  assert_eq!(back.status, ApplicationStatus::Pending);
  assert_eq!(back.additional_notes.as_deref(), Some("second look"));

  b.delete_application(app.id).await.unwrap();
  assert!(b.find_application(posting.id, seeker).await.unwrap().is_none());
  let listed = b.list_jobs(&JobQuery::default()).await.unwrap();
  assert_eq!(listed[0].job.applications_count, 0);
}
