//! [`AuthBackend`] for [`SqliteBackend`]: accounts, sessions and one-time
//! codes.

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use chrono::Duration;
use rand_core::OsRng;
use rozgar_core::{
  AuthBackend,
  identity::{AuthEvent, Credentials, Identity, Registration, Session},
};
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  Error, Result,
  backend::{
    ACCESS_TOKEN_TTL_SECS, CODE_TTL_SECS, MAX_CODE_ATTEMPTS, SqliteBackend, digest,
    random_code, random_token,
  },
  encode::{RawIdentity, decode_dt, encode_dt, encode_uuid, now},
};

type CoreResult<T> = rozgar_core::Result<T>;

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) fn normalise_email(email: &str) -> String { email.trim().to_lowercase() }

pub(crate) fn normalise_phone(phone: &str) -> String {
  phone.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

pub(crate) fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    .unwrap_or(false)
}

/// Raw session row joined with its user.
struct RawSession {
  access_token:  String,
  refresh_token: String,
  expires_at:    String,
  identity:      RawIdentity,
}

impl RawSession {
  const SELECT: &'static str = "SELECT u.user_id, u.email, u.phone, u.created_at,
      s.access_token, s.refresh_token, s.expires_at
     FROM sessions s JOIN users u ON u.user_id = s.user_id";

  fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identity:      RawIdentity::read(row)?,
      access_token:  row.get(4)?,
      refresh_token: row.get(5)?,
      expires_at:    row.get(6)?,
    })
  }

  fn into_session(self) -> Result<Session> {
    Ok(Session {
      access_token:  self.access_token,
      refresh_token: self.refresh_token,
      expires_at:    decode_dt(&self.expires_at)?,
      identity:      self.identity.into_identity()?,
    })
  }
}

// ─── Inherent auth helpers ───────────────────────────────────────────────────

impl SqliteBackend {
  /// Insert a `users` row.
  pub(crate) async fn create_user(
    &self,
    email: Option<String>,
    phone: Option<String>,
    password_hash: Option<String>,
  ) -> Result<Identity> {
    let identity = Identity {
      id: Uuid::new_v4(),
      email,
      phone,
      created_at: now(),
    };

    let id_str = encode_uuid(identity.id);
    let at_str = encode_dt(identity.created_at);
    let email = identity.email.clone();
    let phone = identity.phone.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, phone, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, phone, password_hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(identity)
  }

  async fn identity_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<(Identity, Option<String>)>> {
    let raw: Option<(RawIdentity, Option<String>)> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT user_id, email, phone, created_at, password_hash
           FROM users WHERE {column} = ?1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], |row| {
              Ok((RawIdentity::read(row)?, row.get(4)?))
            })
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(identity, hash)| Ok((identity.into_identity()?, hash)))
      .transpose()
  }

  /// Persist a fresh token pair for `identity`.
  pub(crate) async fn issue_session(&self, identity: Identity) -> Result<Session> {
    let now = now();
    let session = Session {
      access_token: random_token(),
      refresh_token: random_token(),
      expires_at: now + Duration::seconds(ACCESS_TOKEN_TTL_SECS),
      identity,
    };

    let access = session.access_token.clone();
    let refresh = session.refresh_token.clone();
    let user_id = encode_uuid(session.identity.id);
    let expires = encode_dt(session.expires_at);
    let created = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (access_token, refresh_token, user_id, expires_at, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![access, refresh, user_id, expires, created],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn session_where(
    &self,
    column: &'static str,
    token: String,
  ) -> Result<Option<Session>> {
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        let sql = format!("{} WHERE s.{column} = ?1", RawSession::SELECT);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![token], RawSession::read)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawSession::into_session).transpose()
  }

  /// Exchange `refresh_token` for a new token pair, invalidating the old one.
  async fn refresh(&self, refresh_token: String) -> Result<Option<Session>> {
    let Some(old) = self.session_where("refresh_token", refresh_token).await? else {
      return Ok(None);
    };

    let old_access = old.access_token.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE access_token = ?1",
          rusqlite::params![old_access],
        )?;
        Ok(())
      })
      .await?;

    let session = self.issue_session(old.identity).await?;
    Ok(Some(session))
  }

  async fn start_session(&self, identity: Identity) -> Result<Session> {
    let session = self.issue_session(identity).await?;
    self.set_current(Some(session.clone())).await;
    self.publish(AuthEvent::signed_in(session.clone()));
    Ok(session)
  }

  /// Complete a password reset started by
  /// [`AuthBackend::request_password_reset`].
  ///
  /// Every existing session of the account is revoked.
  pub async fn reset_password(
    &self,
    token: &str,
    new_password: &str,
  ) -> CoreResult<()> {
    let token_hash = digest(token);
    let now_str = encode_dt(now());

    let user_id: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "DELETE FROM recovery_tokens WHERE token_hash = ?1 AND expires_at > ?2
               RETURNING user_id",
              rusqlite::params![token_hash, now_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;

    let Some(user_id) = user_id else {
      return Err(rozgar_core::Error::InvalidCode);
    };

    let hash = hash_password(new_password)?;
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE users SET password_hash = ?1 WHERE user_id = ?2",
          rusqlite::params![hash, user_id],
        )?;
        tx.execute("DELETE FROM sessions WHERE user_id = ?1", rusqlite::params![user_id])?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(Error::from)?;

    Ok(())
  }
}

// ─── AuthBackend impl ────────────────────────────────────────────────────────

impl AuthBackend for SqliteBackend {
  async fn sign_up(&self, credentials: Credentials) -> CoreResult<Registration> {
    let email = normalise_email(&credentials.email);
    if self.identity_where("email", email.clone()).await?.is_some() {
      return Err(rozgar_core::Error::EmailTaken(email));
    }

    let hash = hash_password(&credentials.password)?;
    let identity = match self.create_user(Some(email.clone()), None, Some(hash)).await {
      Ok(identity) => identity,
      // Lost a race with a concurrent sign-up for the same address.
      Err(e) => match rozgar_core::Error::from(e) {
        rozgar_core::Error::Conflict(_) => return Err(rozgar_core::Error::EmailTaken(email)),
        other => return Err(other),
      },
    };

    let session = self.start_session(identity.clone()).await?;
    tracing::info!(user_id = %identity.id, "account created");
    Ok(Registration { identity, session: Some(session) })
  }

  async fn sign_in_with_password(&self, credentials: Credentials) -> CoreResult<Session> {
    let email = normalise_email(&credentials.email);
    let Some((identity, Some(hash))) = self.identity_where("email", email).await? else {
      return Err(rozgar_core::Error::InvalidCredentials);
    };
    if !verify_password(&credentials.password, &hash) {
      return Err(rozgar_core::Error::InvalidCredentials);
    }
    Ok(self.start_session(identity).await?)
  }

  async fn request_otp(&self, phone: String) -> CoreResult<()> {
    let phone = normalise_phone(&phone);
    let code = random_code();
    let code_hash = digest(&code);
    let expires = encode_dt(now() + Duration::seconds(CODE_TTL_SECS));

    let key = phone.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO otp_codes (phone, code_hash, expires_at, attempts)
           VALUES (?1, ?2, ?3, 0)",
          rusqlite::params![key, code_hash, expires],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from)?;

    self.sender.send_otp(&phone, &code);
    Ok(())
  }

  async fn verify_otp(&self, phone: String, code: String) -> CoreResult<Session> {
    let phone = normalise_phone(&phone);
    let code_hash = digest(code.trim());
    let now_str = encode_dt(now());

    let key = phone.clone();
    let matched: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let deleted = tx.execute(
          "DELETE FROM otp_codes
           WHERE phone = ?1 AND code_hash = ?2 AND expires_at > ?3",
          rusqlite::params![key, code_hash, now_str],
        )?;
        if deleted == 0 {
          // A wrong guess counts against the outstanding code, which is
          // dropped once it runs out of attempts.
          tx.execute(
            "UPDATE otp_codes SET attempts = attempts + 1 WHERE phone = ?1",
            rusqlite::params![key],
          )?;
          tx.execute(
            "DELETE FROM otp_codes WHERE phone = ?1 AND attempts >= ?2",
            rusqlite::params![key, MAX_CODE_ATTEMPTS],
          )?;
        }
        tx.commit()?;
        Ok(deleted == 1)
      })
      .await
      .map_err(Error::from)?;

    if !matched {
      return Err(rozgar_core::Error::InvalidCode);
    }

    let identity = match self.identity_where("phone", phone.clone()).await? {
      Some((identity, _)) => identity,
      None => self.create_user(None, Some(phone), None).await?,
    };
    Ok(self.start_session(identity).await?)
  }

  async fn sign_out(&self) -> CoreResult<()> {
    let current = self.auth.current.write().await.take();
    if let Some(session) = current {
      let access = session.access_token;
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "DELETE FROM sessions WHERE access_token = ?1",
            rusqlite::params![access],
          )?;
          Ok(())
        })
        .await
        .map_err(Error::from)?;
    }
    self.publish(AuthEvent::signed_out());
    Ok(())
  }

  async fn request_password_reset(&self, email: String) -> CoreResult<()> {
    let email = normalise_email(&email);
    let Some((identity, _)) = self.identity_where("email", email.clone()).await? else {
      tracing::debug!(%email, "password reset for unknown address ignored");
      return Ok(());
    };

    let token = random_token();
    let token_hash = digest(&token);
    let user_id = encode_uuid(identity.id);
    let expires = encode_dt(now() + Duration::seconds(CODE_TTL_SECS));

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO recovery_tokens (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![token_hash, user_id, expires],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from)?;

    self.sender.send_reset(&email, &token);
    Ok(())
  }

  async fn restore_session(&self, saved: Session) -> CoreResult<Option<Session>> {
    let now = now();

    let live = self
      .session_where("access_token", saved.access_token.clone())
      .await?
      .filter(|s| !s.is_expired(now) && s.refresh_token == saved.refresh_token);

    if let Some(session) = live {
      self.set_current(Some(session.clone())).await;
      return Ok(Some(session));
    }

    let Some(session) = self.refresh(saved.refresh_token).await? else {
      tracing::debug!("saved session is no longer valid");
      return Ok(None);
    };
    self.set_current(Some(session.clone())).await;
    self.publish(AuthEvent::refreshed(session.clone()));
    Ok(Some(session))
  }

  async fn current_session(&self) -> Option<Session> { self.auth.current.read().await.clone() }

  fn subscribe(&self) -> broadcast::Receiver<AuthEvent> { self.auth.events.subscribe() }
}
