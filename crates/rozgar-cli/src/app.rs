//! Terminal state machine and key dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rozgar_app::{App, View, session::Role};
use rozgar_core::{
  Backend,
  application::{ApplicationQuery, ApplicationRecord, NewApplication},
  identity::Credentials,
  job::{JobListing, JobPatch, JobQuery},
};
use uuid::Uuid;

// ─── Login form ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
  Email,
  Otp,
}

/// The sign-in form shown on the landing view.
#[derive(Debug)]
pub struct LoginForm {
  pub mode:     LoginMode,
  pub email:    String,
  pub password: String,
  pub phone:    String,
  pub code:     String,
  /// Account kind for email sign-in.
  pub role:     Role,
  /// A code was requested for `phone`; the code field is now shown.
  pub otp_sent: bool,
  pub focus:    usize,
}

/// One visible form field: label key, value, masked.
pub struct Field<'a> {
  pub label:  &'static str,
  pub value:  &'a str,
  pub secret: bool,
}

impl LoginForm {
  fn new() -> Self {
    Self {
      mode:     LoginMode::Email,
      email:    String::new(),
      password: String::new(),
      phone:    String::new(),
      code:     String::new(),
      role:     Role::JobSeeker,
      otp_sent: false,
      focus:    0,
    }
  }

  pub fn fields(&self) -> Vec<Field<'_>> {
    match self.mode {
      LoginMode::Email => vec![
        Field { label: "auth.email", value: &self.email, secret: false },
        Field { label: "auth.password", value: &self.password, secret: true },
      ],
      LoginMode::Otp if self.otp_sent => vec![
        Field { label: "auth.phone.number", value: &self.phone, secret: false },
        Field { label: "auth.otp.code", value: &self.code, secret: false },
      ],
      LoginMode::Otp => {
        vec![Field { label: "auth.phone.number", value: &self.phone, secret: false }]
      }
    }
  }

  /// Label key for the submit action in the current mode.
  pub fn action(&self) -> &'static str {
    match self.mode {
      LoginMode::Email => "auth.signin",
      LoginMode::Otp if self.otp_sent => "auth.otp.verify",
      LoginMode::Otp => "auth.otp.send",
    }
  }

  fn focused_mut(&mut self) -> &mut String {
    match (self.mode, self.focus) {
      (LoginMode::Email, 0) => &mut self.email,
      (LoginMode::Email, _) => &mut self.password,
      (LoginMode::Otp, 0) => &mut self.phone,
      (LoginMode::Otp, _) => &mut self.code,
    }
  }

  fn step_focus(&mut self, forward: bool) {
    let count = self.fields().len();
    self.focus = if forward { (self.focus + 1) % count } else { (self.focus + count - 1) % count };
  }

  fn toggle_mode(&mut self) {
    self.mode = match self.mode {
      LoginMode::Email => LoginMode::Otp,
      LoginMode::Otp => LoginMode::Email,
    };
    self.focus = 0;
  }
}

// ─── Tabs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Jobs,
  Applications,
}

impl Tab {
  fn other(self) -> Self {
    match self {
      Self::Jobs => Self::Applications,
      Self::Applications => Self::Jobs,
    }
  }
}

// ─── Tui ──────────────────────────────────────────────────────────────────────

/// Top-level terminal state over a running [`App`].
pub struct Tui<B: Backend> {
  pub app:           App<B>,
  /// Running on the local database rather than a hosted backend.
  pub offline:       bool,
  /// The view the data below was loaded for.
  pub view:          View,
  pub tab:           Tab,
  /// Row under the cursor in the current tab's table.
  pub cursor:        usize,
  pub search:        String,
  pub search_active: bool,
  pub form:          LoginForm,
}

impl<B: Backend> Tui<B> {
  pub fn new(app: App<B>, offline: bool) -> Self {
    Self {
      app,
      offline,
      view: View::Loading,
      tab: Tab::Jobs,
      cursor: 0,
      search: String::new(),
      search_active: false,
      form: LoginForm::new(),
    }
  }

  pub fn user_id(&self) -> Option<Uuid> { self.app.session.snapshot().identity().map(|i| i.id) }

  /// Follow the router. Entering a new view resets the cursor and loads its
  /// data.
  pub async fn sync(&mut self) {
    let view = self.app.view();
    if view == self.view {
      return;
    }
    tracing::debug!(from = ?self.view, to = ?view, "view changed");
    self.view = view;
    self.tab = Tab::Jobs;
    self.cursor = 0;
    self.search.clear();
    self.search_active = false;
    self.load().await;
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  fn job_query(&self) -> JobQuery {
    let query = match (self.view, self.user_id()) {
      (View::Employer, Some(owner)) => JobQuery::owned_by(owner),
      (View::Admin, _) => JobQuery::everything(),
      _ => JobQuery::default(),
    };
    query.with_search(self.search.clone())
  }

  fn application_query(&self) -> Option<ApplicationQuery> {
    match (self.view, self.user_id()) {
      (View::JobSeeker, Some(id)) => Some(ApplicationQuery::by_applicant(id)),
      (View::Employer, Some(id)) => Some(ApplicationQuery::for_employer(id)),
      (View::Admin, _) => Some(ApplicationQuery::default()),
      _ => None,
    }
  }

  /// Reload what the current view shows. Failures are already toasted.
  async fn load(&mut self) {
    if self.view == View::Loading {
      return;
    }
    let _ = self.app.jobs.list(self.job_query()).await;
    if let Some(query) = self.application_query() {
      let _ = self.app.applications.list(query).await;
    }
    self.clamp_cursor();
  }

  pub fn row_count(&self) -> usize {
    match self.tab {
      Tab::Jobs => self.app.jobs.listings().len(),
      Tab::Applications => self.app.applications.records().len(),
    }
  }

  fn clamp_cursor(&mut self) { self.cursor = self.cursor.min(self.row_count().saturating_sub(1)); }

  pub fn selected_job(&self) -> Option<JobListing> {
    self.app.jobs.listings().into_iter().nth(self.cursor)
  }

  pub fn selected_record(&self) -> Option<ApplicationRecord> {
    self.app.applications.records().into_iter().nth(self.cursor)
  }

  /// Whether the signed-in job seeker has applied to `job_id`, judged from
  /// the loaded applications.
  pub fn has_applied(&self, job_id: Uuid) -> bool {
    self.view == View::JobSeeker
      && self.app.applications.records().iter().any(|r| r.application.job_id == job_id)
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }
    if self.search_active {
      self.handle_search_key(key).await;
      return Ok(true);
    }

    match key.code {
      KeyCode::Esc => return Ok(false),
      KeyCode::F(2) => {
        let language = self.app.locale.toggle();
        tracing::info!(%language, "language switched");
        return Ok(true);
      }
      KeyCode::F(10) if self.user_id().is_some() => {
        let _ = self.app.session.sign_out().await;
        self.form = LoginForm::new();
        return Ok(true);
      }
      _ => {}
    }

    match self.view {
      View::Loading => {}
      View::Landing => self.handle_landing_key(key).await,
      View::JobSeeker => self.handle_seeker_key(key).await,
      View::Employer | View::Admin => self.handle_manage_key(key).await,
    }
    Ok(true)
  }

  async fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search.clear();
        self.cursor = 0;
        self.load().await;
      }
      KeyCode::Enter => {
        self.search_active = false;
        self.cursor = 0;
        self.load().await;
      }
      KeyCode::Backspace => {
        self.search.pop();
      }
      KeyCode::Char(c) => self.search.push(c),
      _ => {}
    }
  }

  async fn handle_landing_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Tab | KeyCode::Down => self.form.step_focus(true),
      KeyCode::BackTab | KeyCode::Up => self.form.step_focus(false),
      KeyCode::F(3) => self.form.toggle_mode(),
      KeyCode::F(4) => self.form.role = self.form.role.next(),
      KeyCode::Enter => self.submit_login().await,
      KeyCode::Backspace => {
        self.form.focused_mut().pop();
      }
      KeyCode::Char(c) => self.form.focused_mut().push(c),
      _ => {}
    }
  }

  async fn submit_login(&mut self) {
    let session = &self.app.session;
    match self.form.mode {
      LoginMode::Email => {
        let credentials = Credentials::new(self.form.email.clone(), self.form.password.clone());
        if session.sign_in_as(credentials, self.form.role).await.is_ok() {
          self.form = LoginForm::new();
        }
      }
      LoginMode::Otp if !self.form.otp_sent => {
        if session.request_otp(&self.form.phone).await.is_ok() {
          self.form.otp_sent = true;
          self.form.focus = 1;
        }
      }
      LoginMode::Otp => {
        if session.verify_otp(&self.form.phone, &self.form.code).await.is_ok() {
          self.form = LoginForm::new();
        } else {
          self.form.code.clear();
        }
      }
    }
  }

  /// Keys shared by every signed-in board. Returns `true` if handled.
  async fn handle_board_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Tab => {
        self.tab = self.tab.other();
        self.cursor = 0;
        self.load().await;
      }
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.row_count() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Char('/') if self.tab == Tab::Jobs => {
        self.search_active = true;
        self.search.clear();
      }
      KeyCode::Char('r') => self.load().await,
      _ => return false,
    }
    true
  }

  async fn handle_seeker_key(&mut self, key: KeyEvent) {
    if self.handle_board_key(key).await || self.tab != Tab::Jobs {
      return;
    }
    let Some(job) = self.selected_job() else { return };
    match key.code {
      KeyCode::Enter => {
        self.app.jobs.increment_views(job.job.id).await;
        let _ = self.app.jobs.refresh().await;
      }
      KeyCode::Char('a') => {
        let Some(user_id) = self.user_id() else { return };
        let _ = self.app.applications.create(NewApplication::new(job.job.id, user_id)).await;
      }
      _ => {}
    }
  }

  async fn handle_manage_key(&mut self, key: KeyEvent) {
    if self.handle_board_key(key).await {
      return;
    }
    match (self.tab, key.code) {
      (Tab::Jobs, KeyCode::Char('s')) => {
        if let Some(job) = self.selected_job() {
          let next = job.job.status.cycle();
          let _ = self.app.jobs.update(job.job.id, JobPatch::status(next)).await;
        }
      }
      (Tab::Jobs, KeyCode::Char('d')) => {
        if let Some(job) = self.selected_job() {
          let _ = self.app.jobs.delete(job.job.id).await;
          self.clamp_cursor();
        }
      }
      (Tab::Applications, KeyCode::Char('s')) => {
        if let Some(record) = self.selected_record() {
          let application = &record.application;
          let next = application.status.next();
          let _ = self.app.applications.update_status(application.id, next).await;
        }
      }
      (Tab::Applications, KeyCode::Char('d')) => {
        if let Some(record) = self.selected_record() {
          let _ = self.app.applications.delete(record.application.id).await;
          self.clamp_cursor();
        }
      }
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn otp_form_grows_a_code_field() {
    let mut form = LoginForm::new();
    assert_eq!(form.fields().len(), 2);
    assert_eq!(form.action(), "auth.signin");

    form.toggle_mode();
    assert_eq!(form.fields().len(), 1);
    assert_eq!(form.action(), "auth.otp.send");
    form.step_focus(true);
    assert_eq!(form.focus, 0);

    form.otp_sent = true;
    form.step_focus(true);
    form.focused_mut().push_str("123456");
    assert_eq!(form.code, "123456");
    assert_eq!(form.action(), "auth.otp.verify");
  }

  #[test]
  fn role_cycles_through_every_account_kind() {
    let mut form = LoginForm::new();
    assert_eq!(form.role, Role::JobSeeker);
    form.role = form.role.next();
    assert_eq!(form.role, Role::Employer);
    form.role = form.role.next();
    assert_eq!(form.role, Role::Admin);
    assert_eq!(form.role.next(), Role::JobSeeker);
  }

  #[test]
  fn focus_wraps_both_ways() {
    let mut form = LoginForm::new();
    form.step_focus(false);
    assert_eq!(form.focus, 1);
    form.focused_mut().push('x');
    assert_eq!(form.password, "x");
    form.step_focus(true);
    assert_eq!(form.focus, 0);
  }
}
