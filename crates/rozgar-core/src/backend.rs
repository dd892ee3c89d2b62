//! The backend collaborator: authentication plus table-style CRUD.
//!
//! Implemented by `rozgar-store-sqlite` (in-process, offline) and
//! `rozgar-remote` (hosted service over HTTP). The client layer depends on
//! these traits only.

use std::future::Future;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  Result,
  admin::AdminGrant,
  application::{
    Application, ApplicationPatch, ApplicationQuery, ApplicationRecord,
    NewApplication,
  },
  identity::{AuthEvent, Credentials, Registration, Session},
  job::{JobListing, JobPatch, JobPosting, JobQuery, NewJob},
  profile::{NewProfile, Profile, ProfilePatch},
};

// ─── Auth ────────────────────────────────────────────────────────────────────

/// Identity and session management.
///
/// The backend owns the *current* session. Every method that changes it also
/// publishes an [`AuthEvent`] to the receivers handed out by
/// [`AuthBackend::subscribe`].
pub trait AuthBackend: Send + Sync {
  /// Create an identity for the given credentials.
  ///
  /// Fails with [`Error::EmailTaken`](crate::Error::EmailTaken) if the
  /// address is already registered.
  fn sign_up(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Registration>> + Send + '_;

  /// Fails with [`Error::InvalidCredentials`](crate::Error::InvalidCredentials)
  /// for an unknown address or a wrong password.
  fn sign_in_with_password(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Session>> + Send + '_;

  /// First phase of phone sign-in: have a one-time code sent to `phone`.
  fn request_otp(
    &self,
    phone: String,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Second phase of phone sign-in. Creates the identity on first use.
  fn verify_otp(
    &self,
    phone: String,
    code: String,
  ) -> impl Future<Output = Result<Session>> + Send + '_;

  /// End the current session. Succeeds when nobody is signed in.
  fn sign_out(&self) -> impl Future<Output = Result<()>> + Send + '_;

  /// Send a password-reset link to `email`. Unknown addresses succeed
  /// silently.
  fn request_password_reset(
    &self,
    email: String,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Validate a session saved by a previous run, refreshing it if the access
  /// token expired. Returns `None` if the session can no longer be used.
  fn restore_session(
    &self,
    saved: Session,
  ) -> impl Future<Output = Result<Option<Session>>> + Send + '_;

  fn current_session(&self) -> impl Future<Output = Option<Session>> + Send + '_;

  fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

// ─── Tables ──────────────────────────────────────────────────────────────────

/// CRUD over `profiles`, `admin_users`, `jobs` and `applications`.
///
/// "No matching row" is never an error for the lookup methods; they return
/// `None`. Updates of a missing row fail with
/// [`Error::NotFound`](crate::Error::NotFound).
pub trait Tables: Send + Sync {
  // ── Profiles ──────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>>> + Send + '_;

  fn insert_profile(
    &self,
    profile: NewProfile,
  ) -> impl Future<Output = Result<Profile>> + Send + '_;

  fn update_profile(
    &self,
    id: Uuid,
    patch: ProfilePatch,
  ) -> impl Future<Output = Result<Profile>> + Send + '_;

  // ── Admin grants ──────────────────────────────────────────────────────

  /// The active grant for `user_id`, if any.
  fn active_admin_grant(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<AdminGrant>>> + Send + '_;

  // ── Jobs ──────────────────────────────────────────────────────────────

  fn list_jobs<'a>(
    &'a self,
    query: &'a JobQuery,
  ) -> impl Future<Output = Result<Vec<JobListing>>> + Send + 'a;

  fn insert_job(
    &self,
    job: NewJob,
  ) -> impl Future<Output = Result<JobPosting>> + Send + '_;

  fn update_job(
    &self,
    id: Uuid,
    patch: JobPatch,
  ) -> impl Future<Output = Result<JobPosting>> + Send + '_;

  fn delete_job(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send + '_;

  /// Bump the posting's view counter server-side.
  fn increment_job_views(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  fn list_applications<'a>(
    &'a self,
    query: &'a ApplicationQuery,
  ) -> impl Future<Output = Result<Vec<ApplicationRecord>>> + Send + 'a;

  fn find_application(
    &self,
    job_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Application>>> + Send + '_;

  /// Fails with [`Error::Conflict`](crate::Error::Conflict) if the backend
  /// enforces (job, applicant) uniqueness and the pair already exists.
  fn insert_application(
    &self,
    application: NewApplication,
  ) -> impl Future<Output = Result<Application>> + Send + '_;

  fn update_application(
    &self,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> impl Future<Output = Result<Application>> + Send + '_;

  fn delete_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

/// Everything the client layer needs from a backend.
pub trait Backend: AuthBackend + Tables + 'static {}

impl<T: AuthBackend + Tables + 'static> Backend for T {}
