//! [`SqliteBackend`]: the in-process implementation of the Rozgar backend.

use std::{path::Path, sync::Arc};

use rand_core::{OsRng, RngCore as _};
use rozgar_core::identity::{AuthEvent, Session};
use sha2::{Digest as _, Sha256};
use tokio::sync::{RwLock, broadcast};

use crate::{
  Result,
  schema::{MIGRATE_FROM_V1, SCHEMA},
  sender::{CodeSender, LogSender},
};

/// Seconds an access token stays valid before it must be refreshed.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Seconds a one-time code or reset token stays valid.
pub const CODE_TTL_SECS: i64 = 5 * 60;

/// Wrong guesses a one-time code survives. The next one burns it.
pub const MAX_CODE_ATTEMPTS: i64 = 5;

const EVENT_CAPACITY: usize = 32;

// ─── Backend ─────────────────────────────────────────────────────────────────

/// A Rozgar backend stored in a single SQLite file.
///
/// Cloning is cheap; clones share the connection, the current session and the
/// auth-event channel.
#[derive(Clone)]
pub struct SqliteBackend {
  pub(crate) conn:   tokio_rusqlite::Connection,
  pub(crate) auth:   Arc<AuthState>,
  pub(crate) sender: Arc<dyn CodeSender>,
}

pub(crate) struct AuthState {
  pub(crate) current: RwLock<Option<Session>>,
  pub(crate) events:  broadcast::Sender<AuthEvent>,
}

impl SqliteBackend {
  /// Open (or create) a backend at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn).await
  }

  /// Open an in-memory backend; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    let backend = Self {
      conn,
      auth: Arc::new(AuthState { current: RwLock::new(None), events }),
      sender: Arc::new(LogSender),
    };
    backend.init_schema().await?;
    Ok(backend)
  }

  /// Replace the channel used to deliver one-time codes and reset tokens.
  pub fn with_code_sender(mut self, sender: Arc<dyn CodeSender>) -> Self {
    self.sender = sender;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version == 1 {
          tracing::info!("migrating database from version 1");
          conn.execute_batch(MIGRATE_FROM_V1)?;
        }
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert the demo accounts and postings into an empty database.
  ///
  /// Returns `false` without touching anything if any user exists.
  pub async fn seed_demo(&self) -> Result<bool> { crate::seed::seed_demo(self).await }

  // ── Session bookkeeping ───────────────────────────────────────────────

  pub(crate) async fn set_current(&self, session: Option<Session>) {
    *self.auth.current.write().await = session;
  }

  pub(crate) fn publish(&self, event: AuthEvent) {
    // No receivers just means nobody is listening yet.
    let _ = self.auth.events.send(event);
  }
}

// ─── Secrets ─────────────────────────────────────────────────────────────────

/// 32 random bytes, hex-encoded.
pub(crate) fn random_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// A zero-padded six-digit code.
pub(crate) fn random_code() -> String { format!("{:06}", OsRng.next_u32() % 1_000_000) }

pub(crate) fn digest(secret: &str) -> String { hex::encode(Sha256::digest(secret.as_bytes())) }
