//! Client configuration: file, then `ROZGAR_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// Hosted backend project URL. Absent means offline mode.
  #[serde(default)]
  pub backend_url:          Option<String>,
  /// Public ("anon") key for the hosted backend.
  #[serde(default)]
  pub api_key:              Option<String>,
  #[serde(default = "default_data_dir")]
  pub data_dir:             PathBuf,
  /// Fill an empty offline database with the demo users and jobs.
  #[serde(default = "default_seed_demo")]
  pub seed_demo:            bool,
  #[serde(default = "default_timeout_secs")]
  pub request_timeout_secs: u64,
}

fn default_data_dir() -> PathBuf { PathBuf::from("~/.local/share/rozgar") }

fn default_seed_demo() -> bool { true }

fn default_timeout_secs() -> u64 { 30 }

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      backend_url:          None,
      api_key:              None,
      data_dir:             default_data_dir(),
      seed_demo:            default_seed_demo(),
      request_timeout_secs: default_timeout_secs(),
    }
  }
}

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
  Hosted { url: String, api_key: String },
  Offline,
}

impl ClientConfig {
  /// Read `file` (optional: a missing file is not an error) and overlay
  /// `ROZGAR_*` variables.
  pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(file) = file {
      builder = builder.add_source(config::File::from(file).required(false));
    }
    builder
      .add_source(config::Environment::with_prefix("ROZGAR"))
      .build()?
      .try_deserialize()
  }

  /// The data directory with `~` expanded.
  pub fn data_dir(&self) -> PathBuf { expand_tilde(&self.data_dir) }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  /// Hosted when both URL and key are set and non-blank; otherwise offline,
  /// with a warning.
  pub fn backend_mode(&self) -> BackendMode {
    let url = self.backend_url.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let key = self.api_key.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match (url, key) {
      (Some(url), Some(key)) => BackendMode::Hosted { url: url.to_owned(), api_key: key.to_owned() },
      _ => {
        tracing::warn!("backend URL or API key missing; running offline on the local database");
        BackendMode::Offline
      }
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
