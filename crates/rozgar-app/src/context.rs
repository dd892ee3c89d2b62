//! The application context handed to every view.

use std::sync::Arc;

use rozgar_core::Backend;

use crate::{
  applications::Applications,
  jobs::Jobs,
  locale::Locale,
  notify::{Toaster, ToastQueue},
  persist::Persistence,
  router::{RouteInput, View, route},
  session::SessionStore,
};

/// Locale, session, data hooks and toast queue for one run of the app.
pub struct App<B: Backend> {
  pub backend:      Arc<B>,
  pub locale:       Locale,
  pub toasts:       Arc<ToastQueue>,
  pub session:      SessionStore<B>,
  pub jobs:         Jobs<B>,
  pub applications: Applications<B>,
}

impl<B: Backend> App<B> {
  /// Wire everything up and start the session store. Must be called inside
  /// a Tokio runtime.
  pub fn start(backend: Arc<B>, persistence: Persistence) -> Self {
    let locale = Locale::load(persistence.clone());
    let toasts = Arc::new(ToastQueue::new());
    let toaster = Toaster::new(locale.clone(), toasts.clone());

    let session = SessionStore::start(Arc::clone(&backend), persistence, toaster.clone());
    let jobs = Jobs::new(Arc::clone(&backend), toaster.clone());
    let applications = Applications::new(Arc::clone(&backend), toaster);
    tracing::info!(language = %locale.language(), "app started");

    Self { backend, locale, toasts, session, jobs, applications }
  }

  /// The view the router picks for the current session snapshot.
  pub fn view(&self) -> View { route(RouteInput::from(&self.session.snapshot())) }

  pub fn translate(&self, key: &str) -> String { self.locale.translate(key) }

  /// Stop background tasks.
  pub fn shutdown(self) {
    tracing::info!("app shutting down");
    drop(self);
  }
}
