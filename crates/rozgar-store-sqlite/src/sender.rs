//! Delivery of one-time codes and password-reset tokens.
//!
//! The local backend has no SMS or mail gateway; it hands secrets to a
//! [`CodeSender`] instead.

/// Out-of-band delivery channel for auth secrets.
pub trait CodeSender: Send + Sync {
  fn send_otp(&self, phone: &str, code: &str);

  fn send_reset(&self, email: &str, token: &str);
}

/// Writes secrets to the `tracing` log. Suitable only for local use.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSender;

impl CodeSender for LogSender {
  fn send_otp(&self, phone: &str, code: &str) {
    tracing::info!(%phone, %code, "one-time code issued");
  }

  fn send_reset(&self, email: &str, token: &str) {
    tracing::info!(%email, %token, "password reset token issued");
  }
}
