//! Transient user-facing notifications ("toasts").

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
  time::{Duration, Instant},
};

use crate::locale::Locale;

/// How long a toast stays visible.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
  Success,
  Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
  pub level:     ToastLevel,
  pub message:   String,
  pub raised_at: Instant,
}

/// Receives already-localised messages.
pub trait Notifier: Send + Sync {
  fn notify(&self, level: ToastLevel, message: String);
}

/// A [`Notifier`] that keeps toasts until they expire.
#[derive(Debug)]
pub struct ToastQueue {
  toasts: Mutex<VecDeque<Toast>>,
  ttl:    Duration,
}

impl Default for ToastQueue {
  fn default() -> Self { Self::with_ttl(TOAST_TTL) }
}

impl ToastQueue {
  pub fn new() -> Self { Self::default() }

  pub fn with_ttl(ttl: Duration) -> Self {
    Self { toasts: Mutex::new(VecDeque::new()), ttl }
  }

  fn toasts(&self) -> MutexGuard<'_, VecDeque<Toast>> {
    self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Unexpired toasts, oldest first. Expired ones are dropped.
  pub fn active(&self) -> Vec<Toast> {
    let now = Instant::now();
    let mut toasts = self.toasts();
    toasts.retain(|t| now.duration_since(t.raised_at) < self.ttl);
    toasts.iter().cloned().collect()
  }

  /// Remove and return everything queued, expired or not.
  pub fn drain(&self) -> Vec<Toast> { self.toasts().drain(..).collect() }
}

impl Notifier for ToastQueue {
  fn notify(&self, level: ToastLevel, message: String) {
    self.toasts().push_back(Toast { level, message, raised_at: Instant::now() });
  }
}

/// Raises toasts by string-table key in the current language.
#[derive(Clone)]
pub struct Toaster {
  locale:   Locale,
  notifier: Arc<dyn Notifier>,
}

impl Toaster {
  pub fn new(locale: Locale, notifier: Arc<dyn Notifier>) -> Self { Self { locale, notifier } }

  pub fn success(&self, key: &str) {
    self.notifier.notify(ToastLevel::Success, self.locale.translate(key));
  }

  pub fn error(&self, key: &str) {
    self.notifier.notify(ToastLevel::Error, self.locale.translate(key));
  }

  pub fn locale(&self) -> &Locale { &self.locale }
}
