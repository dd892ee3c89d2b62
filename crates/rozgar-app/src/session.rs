//! The session store: who is signed in, their profile, and whether they are
//! an admin.
//!
//! The store follows the backend's current session. Whenever the session
//! changes to a new token it re-fetches the two derived facts (profile and
//! admin grant) in a background task. Each fetch is tagged with the identity
//! and a generation counter, and its results are dropped if either moved on
//! before it finished. Starting a fetch for a new session also aborts the
//! previous one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rozgar_core::{
  Backend, Error,
  identity::{AuthEvent, Credentials, Identity, Registration, Session},
  profile::{NewProfile, Profile, ProfilePatch, UserType},
};
use tokio::{
  sync::{broadcast, watch},
  task::JoinHandle,
};
use uuid::Uuid;

use crate::{
  notify::Toaster,
  outcome::{self, Failure, Outcome},
  persist::{CURRENT_USER, Persistence, StoredUser},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// The saved session has not been checked yet.
  Initializing,
  Anonymous,
  Authenticated,
}

/// The store's current value.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
  pub phase:           Phase,
  pub session:         Option<Session>,
  pub profile:         Option<Profile>,
  pub is_admin:        bool,
  /// The profile lookup for this identity has completed at least once.
  pub profile_checked: bool,
  /// The admin-grant lookup for this identity has completed at least once.
  pub admin_checked:   bool,
  generation:          u64,
}

impl SessionSnapshot {
  fn initial() -> Self {
    Self {
      phase:           Phase::Initializing,
      session:         None,
      profile:         None,
      is_admin:        false,
      profile_checked: false,
      admin_checked:   false,
      generation:      0,
    }
  }

  pub fn identity(&self) -> Option<&Identity> { self.session.as_ref().map(|s| &s.identity) }

  /// Whether the view should still show a spinner: startup is not done, or
  /// a signed-in identity's profile or admin lookup has not come back yet.
  pub fn is_resolving(&self) -> bool {
    match self.phase {
      Phase::Initializing => true,
      Phase::Anonymous => false,
      Phase::Authenticated => !(self.profile_checked && self.admin_checked),
    }
  }

  fn stored_user(&self) -> Option<StoredUser> {
    let session = self.session.clone()?;
    Some(StoredUser {
      session,
      full_name: self.profile.as_ref().map(|p| p.full_name.clone()),
      user_type: self.profile.as_ref().map(|p| p.user_type),
    })
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// The kind of account a sign-in claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  JobSeeker,
  Employer,
  Admin,
}

impl Role {
  /// Translation key for the role's label.
  pub fn label_key(self) -> &'static str {
    match self {
      Self::JobSeeker => "auth.jobseeker",
      Self::Employer => "auth.employer",
      Self::Admin => "auth.admin",
    }
  }

  pub fn next(self) -> Self {
    match self {
      Self::JobSeeker => Self::Employer,
      Self::Employer => Self::Admin,
      Self::Admin => Self::JobSeeker,
    }
  }
}

impl From<UserType> for Role {
  fn from(user_type: UserType) -> Self {
    match user_type {
      UserType::JobSeeker => Self::JobSeeker,
      UserType::Employer => Self::Employer,
    }
  }
}

/// Everything the sign-up form collects.
#[derive(Debug, Clone)]
pub struct SignUp {
  pub email:        String,
  pub password:     String,
  pub full_name:    String,
  pub phone:        Option<String>,
  pub user_type:    UserType,
  /// Required for employers.
  pub company_name: Option<String>,
  pub location:     Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl SignUp {
  fn validate(&self) -> Outcome<()> {
    outcome::email(&self.email)?;
    outcome::new_password(&self.password)?;
    outcome::required("full_name", &self.full_name)?;
    if self.user_type == UserType::Employer {
      outcome::required("company_name", self.company_name.as_deref().unwrap_or(""))?;
    }
    Ok(())
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

struct Inner<B> {
  backend:     Arc<B>,
  state:       watch::Sender<SessionSnapshot>,
  persistence: Persistence,
  toaster:     Toaster,
  /// The in-flight profile/admin fetch. Also serialises session changes.
  derived:     Mutex<Option<JoinHandle<()>>>,
}

pub struct SessionStore<B: Backend> {
  inner:    Arc<Inner<B>>,
  listener: JoinHandle<()>,
}

/// Handle returned by [`SessionStore::on_change`]. Dropping it stops the
/// handler.
pub struct Subscription {
  task: JoinHandle<()>,
}

impl Subscription {
  pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
  fn drop(&mut self) { self.task.abort(); }
}

impl<B: Backend> Drop for SessionStore<B> {
  fn drop(&mut self) {
    self.listener.abort();
    if let Some(task) = self.inner.derived().take() {
      task.abort();
    }
  }
}

impl<B: Backend> SessionStore<B> {
  /// Begin tracking the backend's session. Returns immediately in
  /// [`Phase::Initializing`]; use [`SessionStore::wait_until_resolved`] to
  /// wait for the first answer.
  ///
  /// Must be called inside a Tokio runtime.
  pub fn start(backend: Arc<B>, persistence: Persistence, toaster: Toaster) -> Self {
    // Subscribe before restoring so no event is missed in between.
    let events = backend.subscribe();
    let (state, _) = watch::channel(SessionSnapshot::initial());
    let inner = Arc::new(Inner {
      backend,
      state,
      persistence,
      toaster,
      derived: Mutex::new(None),
    });
    let listener = tokio::spawn(Arc::clone(&inner).run(events));
    Self { inner, listener }
  }

  pub fn snapshot(&self) -> SessionSnapshot { self.inner.state.borrow().clone() }

  pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> { self.inner.state.subscribe() }

  /// Wait until neither startup nor a derived fetch is pending.
  pub async fn wait_until_resolved(&self) -> SessionSnapshot {
    let mut rx = self.inner.state.subscribe();
    match rx.wait_for(|s| !s.is_resolving()).await {
      Ok(snapshot) => snapshot.clone(),
      Err(_) => self.snapshot(),
    }
  }

  /// Call `handler` with each new snapshot until the returned
  /// [`Subscription`] is dropped. Rapid changes may be coalesced into the
  /// latest one.
  pub fn on_change<F>(&self, handler: F) -> Subscription
  where
    F: Fn(&SessionSnapshot) + Send + Sync + 'static,
  {
    let mut rx = self.inner.state.subscribe();
    rx.mark_unchanged();
    let task = tokio::spawn(async move {
      while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        handler(&snapshot);
      }
    });
    Subscription { task }
  }

  // ── Operations ────────────────────────────────────────────────────────

  pub async fn sign_up(&self, form: SignUp) -> Outcome<Registration> {
    form.validate()?;
    let toaster = &self.inner.toaster;
    let email = form.email.trim().to_owned();

    let registration = match self
      .inner
      .backend
      .sign_up(Credentials::new(email.clone(), form.password))
      .await
    {
      Ok(registration) => registration,
      Err(e) => {
        tracing::error!(error = %e, "sign-up failed");
        match &e {
          Error::EmailTaken(_) => toaster.error("toast.signup.email_taken"),
          _ => toaster.error("toast.signup.failed"),
        }
        return Err(e.into());
      }
    };

    let profile = NewProfile {
      id: registration.identity.id,
      email,
      full_name: form.full_name.trim().to_owned(),
      phone: non_blank(form.phone),
      user_type: form.user_type,
      company_name: non_blank(form.company_name),
      location: non_blank(form.location),
    };
    // The identity exists either way; a missing profile only changes routing.
    match self.inner.backend.insert_profile(profile).await {
      Ok(_) => tracing::info!(user_id = %registration.identity.id, "profile created"),
      Err(e) => tracing::error!(error = %e, "profile creation failed"),
    }

    if let Some(session) = &registration.session {
      self.inner.apply(Some(session.clone()));
      // The sign-in event may have raced ahead of the profile insert.
      self.inner.refetch_derived();
    }
    toaster.success("toast.signup.success");
    Ok(registration)
  }

  /// Email and password sign-in for any kind of account.
  pub async fn sign_in(&self, credentials: Credentials) -> Outcome<Session> {
    self.sign_in_checked(credentials, None).await
  }

  /// Email and password sign-in that is refused unless the account is a
  /// `role` account. Admin needs an active grant; the other roles need a
  /// profile of that type. An identity with no profile yet passes, as does
  /// one whose lookups failed.
  pub async fn sign_in_as(&self, credentials: Credentials, role: Role) -> Outcome<Session> {
    self.sign_in_checked(credentials, Some(role)).await
  }

  async fn sign_in_checked(
    &self,
    credentials: Credentials,
    role: Option<Role>,
  ) -> Outcome<Session> {
    outcome::email(&credentials.email)?;
    outcome::required("password", &credentials.password)?;
    let toaster = &self.inner.toaster;
    let credentials = Credentials::new(credentials.email.trim(), credentials.password);

    match self.inner.backend.sign_in_with_password(credentials).await {
      Ok(session) => {
        if let Some(expected) = role
          && !self.inner.holds_role(session.identity.id, expected).await
        {
          tracing::info!(user_id = %session.identity.id, ?expected, "sign-in refused for role");
          if let Err(e) = self.inner.backend.sign_out().await {
            tracing::warn!(error = %e, "could not drop the refused session");
          }
          self.inner.apply(None);
          toaster.error("toast.signin.wrong_role");
          return Err(Failure::WrongRole { expected });
        }
        self.inner.apply(Some(session.clone()));
        toaster.success("toast.signin.success");
        Ok(session)
      }
      Err(e) => {
        tracing::error!(error = %e, "sign-in failed");
        match &e {
          Error::InvalidCredentials => toaster.error("toast.signin.invalid"),
          _ => toaster.error("toast.signin.failed"),
        }
        Err(e.into())
      }
    }
  }

  /// First half of phone sign-in.
  pub async fn request_otp(&self, phone: &str) -> Outcome<()> {
    outcome::required("phone", phone)?;
    let toaster = &self.inner.toaster;
    match self.inner.backend.request_otp(phone.trim().to_owned()).await {
      Ok(()) => {
        toaster.success("toast.otp.sent");
        Ok(())
      }
      Err(e) => {
        tracing::error!(error = %e, "sending one-time code failed");
        toaster.error("toast.otp.send_failed");
        Err(e.into())
      }
    }
  }

  /// Second half of phone sign-in.
  pub async fn verify_otp(&self, phone: &str, code: &str) -> Outcome<Session> {
    outcome::required("phone", phone)?;
    outcome::required("code", code)?;
    let toaster = &self.inner.toaster;
    let result = self
      .inner
      .backend
      .verify_otp(phone.trim().to_owned(), code.trim().to_owned())
      .await;
    match result {
      Ok(session) => {
        self.inner.apply(Some(session.clone()));
        toaster.success("toast.otp.verified");
        Ok(session)
      }
      Err(e) => {
        tracing::error!(error = %e, "one-time code verification failed");
        match &e {
          Error::InvalidCode => toaster.error("toast.otp.invalid"),
          _ => toaster.error("toast.otp.verify_failed"),
        }
        Err(e.into())
      }
    }
  }

  /// Local state is cleared even if the backend call fails.
  pub async fn sign_out(&self) -> Outcome<()> {
    let result = self.inner.backend.sign_out().await;
    self.inner.apply(None);
    let toaster = &self.inner.toaster;
    match result {
      Ok(()) => {
        toaster.success("toast.signout.success");
        Ok(())
      }
      Err(e) => {
        tracing::error!(error = %e, "sign-out failed");
        toaster.error("toast.signout.failed");
        Err(e.into())
      }
    }
  }

  pub async fn request_password_reset(&self, email: &str) -> Outcome<()> {
    outcome::email(email)?;
    let toaster = &self.inner.toaster;
    match self.inner.backend.request_password_reset(email.trim().to_owned()).await {
      Ok(()) => {
        toaster.success("toast.reset.sent");
        Ok(())
      }
      Err(e) => {
        tracing::error!(error = %e, "password reset request failed");
        toaster.error("toast.reset.failed");
        Err(e.into())
      }
    }
  }

  /// Patch the signed-in identity's profile, then re-read it into the
  /// snapshot.
  pub async fn update_profile(&self, patch: ProfilePatch) -> Outcome<Profile> {
    let Some(user_id) = self.snapshot().identity().map(|i| i.id) else {
      return Err(Failure::NotSignedIn);
    };
    if let Some(name) = &patch.full_name {
      outcome::required("full_name", name)?;
    }
    let toaster = &self.inner.toaster;
    let backend = &self.inner.backend;

    let result = match backend.update_profile(user_id, patch).await {
      Ok(updated) => backend.get_profile(user_id).await.map(|p| p.unwrap_or(updated)),
      Err(e) => Err(e),
    };
    match result {
      Ok(profile) => {
        self.inner.set_profile(user_id, profile.clone());
        toaster.success("toast.profile.updated");
        Ok(profile)
      }
      Err(e) => {
        tracing::error!(error = %e, "profile update failed");
        toaster.error("toast.profile.update_failed");
        Err(e.into())
      }
    }
  }
}

// ─── Internals ───────────────────────────────────────────────────────────────

impl<B: Backend> Inner<B> {
  fn derived(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    self.derived.lock().unwrap_or_else(PoisonError::into_inner)
  }

  async fn run(self: Arc<Self>, mut events: broadcast::Receiver<AuthEvent>) {
    let (restored, keep_saved) = self.restore().await;
    self.track(restored, !keep_saved);

    loop {
      match events.recv().await {
        Ok(event) => {
          tracing::debug!(kind = ?event.kind, "auth state changed");
        }
        Err(broadcast::error::RecvError::Lagged(missed)) => {
          tracing::warn!(missed, "auth events lagged; resynchronising");
        }
        Err(broadcast::error::RecvError::Closed) => break,
      }
      // Ask for the session instead of trusting the event, which may already
      // be stale by the time it is read.
      let current = self.backend.current_session().await;
      self.apply(current);
    }
  }

  /// The session to start with. The flag is set when a saved session could
  /// not be checked and nothing replaced it, so the saved copy must be left
  /// on disk for the next start.
  async fn restore(&self) -> (Option<Session>, bool) {
    let mut unchecked = false;
    if let Some(saved) = self.persistence.load::<StoredUser>(CURRENT_USER) {
      match self.backend.restore_session(saved.session).await {
        Ok(Some(session)) => return (Some(session), false),
        Ok(None) => {
          tracing::info!("saved session is no longer valid");
          if let Err(e) = self.persistence.clear(CURRENT_USER) {
            tracing::warn!(error = %e, "could not clear saved session");
          }
        }
        Err(e) => {
          tracing::error!(error = %e, "could not restore saved session; keeping it");
          unchecked = true;
        }
      }
    }
    let current = self.backend.current_session().await;
    let keep_saved = unchecked && current.is_none();
    (current, keep_saved)
  }

  /// Whether `user_id` may sign in as `role`. Failed lookups do not count
  /// against it.
  async fn holds_role(&self, user_id: Uuid, role: Role) -> bool {
    if role == Role::Admin {
      return match self.backend.active_admin_grant(user_id).await {
        Ok(grant) => grant.is_some(),
        Err(e) => {
          tracing::error!(%user_id, error = %e, "admin lookup failed during sign-in");
          true
        }
      };
    }
    match self.backend.get_profile(user_id).await {
      Ok(Some(profile)) => Role::from(profile.user_type) == role,
      Ok(None) => true,
      Err(e) => {
        tracing::error!(%user_id, error = %e, "profile lookup failed during sign-in");
        true
      }
    }
  }

  /// Make `session` the tracked session. No-op if it is the one already
  /// tracked.
  fn apply(self: &Arc<Self>, session: Option<Session>) { self.track(session, true) }

  /// [`Inner::apply`], optionally leaving the saved snapshot untouched.
  fn track(self: &Arc<Self>, session: Option<Session>, persist: bool) {
    let mut derived = self.derived();
    let mut fetch = None;

    let changed = self.state.send_if_modified(|snap| {
      match (&snap.session, &session) {
        (Some(current), Some(next)) if current.same_token(next) => return false,
        (None, None) if snap.phase == Phase::Anonymous => return false,
        _ => {}
      }
      snap.generation += 1;
      match session {
        Some(next) => {
          let same_identity = snap.identity().is_some_and(|i| i.id == next.identity.id);
          if !same_identity {
            snap.profile = None;
            snap.is_admin = false;
            snap.profile_checked = false;
            snap.admin_checked = false;
          }
          fetch = Some((next.identity.id, snap.generation));
          snap.phase = Phase::Authenticated;
          snap.session = Some(next);
        }
        None => {
          snap.phase = Phase::Anonymous;
          snap.session = None;
          snap.profile = None;
          snap.is_admin = false;
          snap.profile_checked = false;
          snap.admin_checked = false;
        }
      }
      true
    });
    if !changed {
      return;
    }

    if persist {
      self.persist();
    }
    if let Some(task) = derived.take() {
      task.abort();
    }
    if let Some((user_id, generation)) = fetch {
      *derived = Some(tokio::spawn(Arc::clone(self).resolve(user_id, generation)));
    }
  }

  /// Restart the derived fetch for the tracked identity. The snapshot reads
  /// as resolving until the new fetch lands.
  fn refetch_derived(self: &Arc<Self>) {
    let mut derived = self.derived();
    let mut fetch = None;
    self.state.send_if_modified(|snap| {
      let Some(identity) = snap.identity() else { return false };
      let user_id = identity.id;
      snap.generation += 1;
      snap.profile_checked = false;
      snap.admin_checked = false;
      fetch = Some((user_id, snap.generation));
      true
    });
    if let Some((user_id, generation)) = fetch {
      if let Some(task) = derived.take() {
        task.abort();
      }
      *derived = Some(tokio::spawn(Arc::clone(self).resolve(user_id, generation)));
    }
  }

  async fn resolve(self: Arc<Self>, user_id: Uuid, generation: u64) {
    let profile = async {
      let result = self.backend.get_profile(user_id).await;
      let found = match result {
        Ok(Some(profile)) => Some(Some(profile)),
        Ok(None) => {
          tracing::info!(%user_id, "no profile for identity");
          Some(None)
        }
        Err(e) => {
          tracing::error!(%user_id, error = %e, "profile lookup failed");
          None
        }
      };
      self.update_tagged(user_id, generation, |snap| {
        if let Some(profile) = found {
          snap.profile = profile;
        }
        snap.profile_checked = true;
      });
    };

    let admin = async {
      let is_admin = match self.backend.active_admin_grant(user_id).await {
        Ok(grant) => Some(grant.is_some()),
        Err(e) => {
          tracing::error!(%user_id, error = %e, "admin lookup failed");
          None
        }
      };
      self.update_tagged(user_id, generation, |snap| {
        snap.is_admin = is_admin.unwrap_or(false);
        snap.admin_checked = true;
      });
    };

    tokio::join!(profile, admin);
  }

  /// Apply `f` only if the snapshot still belongs to `user_id` at
  /// `generation`.
  fn update_tagged(&self, user_id: Uuid, generation: u64, f: impl FnOnce(&mut SessionSnapshot)) {
    let changed = self.state.send_if_modified(|snap| {
      let current = snap.identity().map(|i| i.id);
      if snap.generation != generation || current != Some(user_id) {
        tracing::debug!(%user_id, generation, "discarding stale lookup");
        return false;
      }
      f(snap);
      true
    });
    if changed {
      self.persist();
    }
  }

  fn set_profile(&self, user_id: Uuid, profile: Profile) {
    let changed = self.state.send_if_modified(|snap| {
      if snap.identity().map(|i| i.id) != Some(user_id) {
        return false;
      }
      snap.profile = Some(profile);
      snap.profile_checked = true;
      true
    });
    if changed {
      self.persist();
    }
  }

  fn persist(&self) {
    let stored = self.state.borrow().stored_user();
    let result = match stored {
      Some(user) => self.persistence.save(CURRENT_USER, &user),
      None => self.persistence.clear(CURRENT_USER),
    };
    if let Err(e) = result {
      tracing::warn!(error = %e, "could not persist session snapshot");
    }
  }
}
