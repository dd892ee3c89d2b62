//! [`AuthBackend`] over the GoTrue endpoints.

use chrono::{Duration, Utc};
use reqwest::{Method, StatusCode};
use rozgar_core::{
  AuthBackend, Error, Result,
  identity::{AuthEvent, Credentials, Registration, Session},
};
use tokio::sync::broadcast;

use crate::{
  client::RemoteBackend,
  error::Failure,
  wire::{
    OtpRequest, OtpVerify, PasswordGrant, Recover, RefreshGrant,
    SignUpResponse, WireSession, WireUser,
  },
};

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 30;

impl RemoteBackend {
  async fn token_grant<B: serde::Serialize>(
    &self,
    grant_type: &str,
    body: &B,
  ) -> Result<Session, Failure> {
    let request = self
      .request(Method::POST, "/auth/v1/token", &self.api_key)
      .query(&[("grant_type", grant_type)])
      .json(body);
    let wire: WireSession = self.send_json(request).await?;
    Ok(wire.into_session(Utc::now()))
  }

  async fn refresh(&self, refresh_token: &str) -> Result<Session, Failure> {
    self
      .token_grant("refresh_token", &RefreshGrant { refresh_token })
      .await
  }

  async fn start_session(&self, session: Session) -> Session {
    self.set_current(Some(session.clone())).await;
    self.publish(AuthEvent::signed_in(session.clone()));
    session
  }

  /// The token to send as is, or the session whose token needs a refresh.
  async fn usable_token(&self) -> Result<String, Session> {
    let Some(session) = self.auth.current.read().await.clone() else {
      return Ok(self.api_key.to_string());
    };
    if session.is_expired(Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS)) {
      return Err(session);
    }
    Ok(session.access_token)
  }

  /// The JWT for a table request: the current session's access token,
  /// refreshed first if it is about to expire, or the project key when
  /// nobody is signed in.
  pub(crate) async fn bearer(&self) -> String {
    let session = match self.usable_token().await {
      Ok(token) => return token,
      Err(session) => session,
    };
    // Refresh tokens are single use, so only one caller may spend it. The
    // rest wait and pick up the new token.
    let _refreshing = self.auth.refreshing.lock().await;
    let session = match self.usable_token().await {
      Ok(token) => return token,
      Err(session) => session,
    };
    match self.refresh(&session.refresh_token).await {
      Ok(fresh) => {
        let token = fresh.access_token.clone();
        self.set_current(Some(fresh.clone())).await;
        self.publish(AuthEvent::refreshed(fresh));
        token
      }
      Err(failure) => {
        tracing::warn!(?failure, "token refresh failed");
        session.access_token
      }
    }
  }
}

impl AuthBackend for RemoteBackend {
  async fn sign_up(&self, credentials: Credentials) -> Result<Registration> {
    let request = self
      .request(Method::POST, "/auth/v1/signup", &self.api_key)
      .json(&PasswordGrant {
        email:    &credentials.email,
        password: &credentials.password,
      });
    let response: SignUpResponse = match self.send_json(request).await {
      Ok(response) => response,
      Err(failure)
        if failure.mentions("user_already_exists")
          || failure.mentions("already registered") =>
      {
        return Err(Error::EmailTaken(credentials.email));
      }
      Err(failure) => return Err(failure.into()),
    };

    match response {
      SignUpResponse::Session(wire) => {
        let session = self.start_session(wire.into_session(Utc::now())).await;
        Ok(Registration {
          identity: session.identity.clone(),
          session:  Some(session),
        })
      }
      SignUpResponse::User(user) => Ok(Registration {
        identity: user.into_identity(),
        session:  None,
      }),
    }
  }

  async fn sign_in_with_password(&self, credentials: Credentials) -> Result<Session> {
    let grant = PasswordGrant {
      email:    &credentials.email,
      password: &credentials.password,
    };
    match self.token_grant("password", &grant).await {
      Ok(session) => Ok(self.start_session(session).await),
      Err(failure) if failure.status() == Some(StatusCode::BAD_REQUEST) => {
        Err(Error::InvalidCredentials)
      }
      Err(failure) => Err(failure.into()),
    }
  }

  async fn request_otp(&self, phone: String) -> Result<()> {
    let request = self
      .request(Method::POST, "/auth/v1/otp", &self.api_key)
      .json(&OtpRequest { phone: &phone });
    self.send(request).await?;
    Ok(())
  }

  async fn verify_otp(&self, phone: String, code: String) -> Result<Session> {
    let request = self
      .request(Method::POST, "/auth/v1/verify", &self.api_key)
      .json(&OtpVerify { kind: "sms", phone: &phone, token: &code });
    match self.send_json::<WireSession>(request).await {
      Ok(wire) => Ok(self.start_session(wire.into_session(Utc::now())).await),
      Err(failure) if failure.is_refusal() => Err(Error::InvalidCode),
      Err(failure) => Err(failure.into()),
    }
  }

  async fn sign_out(&self) -> Result<()> {
    let Some(session) = self.auth.current.write().await.take() else {
      return Ok(());
    };
    self.publish(AuthEvent::signed_out());

    let request = self.request(Method::POST, "/auth/v1/logout", &session.access_token);
    match self.send(request).await {
      Ok(_) => Ok(()),
      // The token is already dead server-side.
      Err(failure) if failure.status() == Some(StatusCode::UNAUTHORIZED) => Ok(()),
      Err(failure) => Err(failure.into()),
    }
  }

  async fn request_password_reset(&self, email: String) -> Result<()> {
    let request = self
      .request(Method::POST, "/auth/v1/recover", &self.api_key)
      .json(&Recover { email: &email });
    self.send(request).await?;
    Ok(())
  }

  async fn restore_session(&self, saved: Session) -> Result<Option<Session>> {
    let now = Utc::now();
    if !saved.is_expired(now + Duration::seconds(REFRESH_MARGIN_SECS)) {
      let request = self.request(Method::GET, "/auth/v1/user", &saved.access_token);
      match self.send_json::<WireUser>(request).await {
        Ok(user) => {
          let session = Session { identity: user.into_identity(), ..saved };
          self.set_current(Some(session.clone())).await;
          return Ok(Some(session));
        }
        Err(failure) if failure.is_refusal() => {
          tracing::debug!("saved access token refused; trying refresh");
        }
        Err(failure) => return Err(failure.into()),
      }
    }

    match self.refresh(&saved.refresh_token).await {
      Ok(session) => {
        self.set_current(Some(session.clone())).await;
        self.publish(AuthEvent::refreshed(session.clone()));
        Ok(Some(session))
      }
      Err(failure) if failure.is_refusal() => Ok(None),
      Err(failure) => Err(failure.into()),
    }
  }

  async fn current_session(&self) -> Option<Session> {
    self.auth.current.read().await.clone()
  }

  fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
    self.auth.events.subscribe()
  }
}
