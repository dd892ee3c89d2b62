//! Connection handling shared by the auth and table halves.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, RequestBuilder, Response};
use rozgar_core::{
  Error, Result,
  identity::{AuthEvent, Session},
};
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock, broadcast};

use crate::error::Failure;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const EVENT_CAPACITY: usize = 32;

/// Connection settings for a hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
  /// Project URL, e.g. `https://xyz.supabase.co`.
  pub base_url: String,
  /// The public ("anon") key. Sent on every request.
  pub api_key:  String,
  pub timeout:  Duration,
}

pub(crate) struct AuthState {
  pub(crate) current:    RwLock<Option<Session>>,
  pub(crate) events:     broadcast::Sender<AuthEvent>,
  /// Held for the length of a token refresh.
  pub(crate) refreshing: Mutex<()>,
}

/// A backend reached over HTTP.
///
/// Cheap to clone; clones share the HTTP pool and the current session.
#[derive(Clone)]
pub struct RemoteBackend {
  pub(crate) http:     Client,
  pub(crate) base_url: Arc<str>,
  pub(crate) api_key:  Arc<str>,
  pub(crate) auth:     Arc<AuthState>,
}

impl RemoteBackend {
  pub fn new(config: RemoteConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .connect_timeout(CONNECT_TIMEOUT)
      .build()
      .map_err(|e| Error::Unavailable(format!("failed to build HTTP client: {e}")))?;
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').into(),
      api_key: config.api_key.into(),
      auth: Arc::new(AuthState {
        current: RwLock::new(None),
        events,
        refreshing: Mutex::new(()),
      }),
    })
  }

  pub(crate) fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// A request carrying the project key and `bearer` as the JWT.
  pub(crate) fn request(&self, method: Method, path: &str, bearer: &str) -> RequestBuilder {
    self
      .http
      .request(method, self.url(path))
      .header("apikey", &*self.api_key)
      .bearer_auth(bearer)
  }

  /// Send and turn non-2xx answers into a [`Failure`].
  pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, Failure> {
    let resp = request.send().await.map_err(Failure::Transport)?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(%status, body = %body, "request refused");
    Err(Failure::from_body(status, &body))
  }

  pub(crate) async fn send_json<T: DeserializeOwned>(
    &self,
    request: RequestBuilder,
  ) -> Result<T, Failure> {
    let resp = self.send(request).await?;
    resp.json().await.map_err(Failure::Transport)
  }

  pub(crate) async fn set_current(&self, session: Option<Session>) {
    *self.auth.current.write().await = session;
  }

  pub(crate) fn publish(&self, event: AuthEvent) {
    // No receivers is fine.
    let _ = self.auth.events.send(event);
  }
}
