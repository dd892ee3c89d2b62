//! Shared fixtures: seeded backends, an app factory, and a wrapper backend
//! that can hold back or fail individual calls.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, Ordering},
};

use rozgar_core::{
  AuthBackend, Error, Result, Tables,
  admin::AdminGrant,
  application::{
    Application, ApplicationPatch, ApplicationQuery, ApplicationRecord,
    NewApplication,
  },
  identity::{AuthEvent, Credentials, Registration, Session},
  job::{JobListing, JobPatch, JobPosting, JobQuery, NewJob},
  profile::{NewProfile, Profile, ProfilePatch},
};
use rozgar_store_sqlite::{CodeSender, SqliteBackend};
use tokio::sync::{Semaphore, broadcast};
use uuid::Uuid;

use crate::{
  App,
  notify::{Toast, ToastLevel},
  persist::Persistence,
};

pub const PASSWORD: &str = "password123";

pub async fn seeded() -> SqliteBackend {
  let backend = SqliteBackend::open_in_memory().await.unwrap();
  assert!(backend.seed_demo().await.unwrap());
  backend
}

pub fn app<B: rozgar_core::Backend>(backend: B) -> App<B> {
  App::start(Arc::new(backend), Persistence::in_memory())
}

pub fn creds(email: &str, password: &str) -> Credentials { Credentials::new(email, password) }

pub fn errors(toasts: &[Toast]) -> usize {
  toasts.iter().filter(|t| t.level == ToastLevel::Error).count()
}

/// Keeps the one-time codes handed out.
#[derive(Default)]
pub struct Capture {
  pub otps: Mutex<Vec<(String, String)>>,
}

impl CodeSender for Capture {
  fn send_otp(&self, phone: &str, code: &str) {
    self.otps.lock().unwrap().push((phone.into(), code.into()));
  }

  fn send_reset(&self, _email: &str, _token: &str) {}
}

impl Capture {
  pub fn last_code(&self) -> String { self.otps.lock().unwrap().last().unwrap().1.clone() }
}

// ─── Wrapper backend ─────────────────────────────────────────────────────────

/// Delegates to a [`SqliteBackend`], with switches for the tests.
pub struct Rigged {
  pub inner:               SqliteBackend,
  /// Held calls wait for a permit while their switch is set.
  pub gate:                Semaphore,
  pub hold_profiles:       AtomicBool,
  pub hold_lists:          AtomicBool,
  pub fail_lists:          AtomicBool,
  /// Makes the pre-insert duplicate check find nothing.
  pub hide_existing:       AtomicBool,
  pub fail_restore:        AtomicBool,
  pub fail_profile_insert: AtomicBool,
  pub fail_admin:          AtomicBool,
}

impl Rigged {
  pub fn new(inner: SqliteBackend) -> Self {
    Self {
      inner,
      gate: Semaphore::new(0),
      hold_profiles: AtomicBool::new(false),
      hold_lists: AtomicBool::new(false),
      fail_lists: AtomicBool::new(false),
      hide_existing: AtomicBool::new(false),
      fail_restore: AtomicBool::new(false),
      fail_profile_insert: AtomicBool::new(false),
      fail_admin: AtomicBool::new(false),
    }
  }

  pub fn release_profiles(&self) {
    self.hold_profiles.store(false, Ordering::SeqCst);
    self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
  }

  pub fn release_lists(&self) {
    self.hold_lists.store(false, Ordering::SeqCst);
    self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
  }

  async fn pass(&self, hold: &AtomicBool) {
    if hold.load(Ordering::SeqCst) {
      let _permit = self.gate.acquire().await.unwrap();
    }
  }

  fn failure(switch: &AtomicBool) -> Result<()> {
    if switch.load(Ordering::SeqCst) {
      return Err(Error::Unavailable("network unreachable".into()));
    }
    Ok(())
  }
}

impl AuthBackend for Rigged {
  async fn sign_up(&self, credentials: Credentials) -> Result<Registration> {
    self.inner.sign_up(credentials).await
  }

  async fn sign_in_with_password(&self, credentials: Credentials) -> Result<Session> {
    self.inner.sign_in_with_password(credentials).await
  }

  async fn request_otp(&self, phone: String) -> Result<()> { self.inner.request_otp(phone).await }

  async fn verify_otp(&self, phone: String, code: String) -> Result<Session> {
    self.inner.verify_otp(phone, code).await
  }

  async fn sign_out(&self) -> Result<()> { self.inner.sign_out().await }

  async fn request_password_reset(&self, email: String) -> Result<()> {
    self.inner.request_password_reset(email).await
  }

  async fn restore_session(&self, saved: Session) -> Result<Option<Session>> {
    Self::failure(&self.fail_restore)?;
    self.inner.restore_session(saved).await
  }

  async fn current_session(&self) -> Option<Session> { self.inner.current_session().await }

  fn subscribe(&self) -> broadcast::Receiver<AuthEvent> { self.inner.subscribe() }
}

impl Tables for Rigged {
  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    self.pass(&self.hold_profiles).await;
    self.inner.get_profile(id).await
  }

  async fn insert_profile(&self, profile: NewProfile) -> Result<Profile> {
    Self::failure(&self.fail_profile_insert)?;
    self.inner.insert_profile(profile).await
  }

  async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<Profile> {
    self.inner.update_profile(id, patch).await
  }

  async fn active_admin_grant(&self, user_id: Uuid) -> Result<Option<AdminGrant>> {
    Self::failure(&self.fail_admin)?;
    self.inner.active_admin_grant(user_id).await
  }

  async fn list_jobs<'a>(&'a self, query: &'a JobQuery) -> Result<Vec<JobListing>> {
    Self::failure(&self.fail_lists)?;
    self.inner.list_jobs(query).await
  }

  async fn insert_job(&self, job: NewJob) -> Result<JobPosting> { self.inner.insert_job(job).await }

  async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<JobPosting> {
    self.inner.update_job(id, patch).await
  }

  async fn delete_job(&self, id: Uuid) -> Result<()> { self.inner.delete_job(id).await }

  async fn increment_job_views(&self, id: Uuid) -> Result<()> {
    self.inner.increment_job_views(id).await
  }

  async fn list_applications<'a>(
    &'a self,
    query: &'a ApplicationQuery,
  ) -> Result<Vec<ApplicationRecord>> {
    Self::failure(&self.fail_lists)?;
    self.pass(&self.hold_lists).await;
    self.inner.list_applications(query).await
  }

  async fn find_application(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Application>> {
    if self.hide_existing.load(Ordering::SeqCst) {
      return Ok(None);
    }
    self.inner.find_application(job_id, user_id).await
  }

  async fn insert_application(&self, application: NewApplication) -> Result<Application> {
    self.inner.insert_application(application).await
  }

  async fn update_application(&self, id: Uuid, patch: ApplicationPatch) -> Result<Application> {
    self.inner.update_application(id, patch).await
  }

  async fn delete_application(&self, id: Uuid) -> Result<()> {
    self.inner.delete_application(id).await
  }
}
