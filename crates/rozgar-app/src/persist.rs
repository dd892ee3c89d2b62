//! Durable storage for the few values that outlive a run.
//!
//! Values are JSON-encoded and addressed by name. Reads never fail: a missing,
//! unreadable or malformed value reads as absent.

use std::{
  collections::HashMap,
  fs, io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex, PoisonError},
};

use rozgar_core::{identity::Session, profile::UserType};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// The cached session snapshot.
pub const CURRENT_USER: &str = "currentUser";

/// The selected display language.
pub const LANGUAGE: &str = "language";

#[derive(Debug, Error)]
pub enum PersistError {
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("encoding error: {0}")]
  Encode(#[from] serde_json::Error),
}

/// What is kept under [`CURRENT_USER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
  pub session:   Session,
  pub full_name: Option<String>,
  pub user_type: Option<UserType>,
}

// ─── Stores ──────────────────────────────────────────────────────────────────

/// Raw string storage keyed by name.
pub trait LocalStore: Send + Sync {
  fn get_raw(&self, name: &str) -> io::Result<Option<String>>;

  fn set_raw(&self, name: &str, value: &str) -> io::Result<()>;

  /// Removing an absent value succeeds.
  fn remove(&self, name: &str) -> io::Result<()>;
}

/// One `<name>.json` file per value under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  fn path(&self, name: &str) -> PathBuf { self.dir.join(format!("{name}.json")) }
}

impl LocalStore for FileStore {
  fn get_raw(&self, name: &str) -> io::Result<Option<String>> {
    match fs::read_to_string(self.path(name)) {
      Ok(s) => Ok(Some(s)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  fn set_raw(&self, name: &str, value: &str) -> io::Result<()> {
    fs::create_dir_all(&self.dir)?;
    let target = self.path(name);
    let tmp = target.with_extension("json.tmp");
    fs::write(&tmp, value)?;
    fs::rename(&tmp, &target)
  }

  fn remove(&self, name: &str) -> io::Result<()> {
    match fs::remove_file(self.path(name)) {
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }
}

/// Process-local storage, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    self.values.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl LocalStore for MemoryStore {
  fn get_raw(&self, name: &str) -> io::Result<Option<String>> {
    Ok(self.values().get(name).cloned())
  }

  fn set_raw(&self, name: &str, value: &str) -> io::Result<()> {
    self.values().insert(name.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&self, name: &str) -> io::Result<()> {
    self.values().remove(name);
    Ok(())
  }
}

// ─── Persistence ─────────────────────────────────────────────────────────────

/// Typed access to a [`LocalStore`]. Cheap to clone.
#[derive(Clone)]
pub struct Persistence {
  store: Arc<dyn LocalStore>,
}

impl Persistence {
  pub fn new(store: Arc<dyn LocalStore>) -> Self { Self { store } }

  pub fn in_memory() -> Self { Self::new(Arc::new(MemoryStore::new())) }

  pub fn in_dir(dir: impl Into<PathBuf>) -> Self { Self::new(Arc::new(FileStore::new(dir))) }

  pub fn save<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), PersistError> {
    let encoded = serde_json::to_string(value)?;
    self.store.set_raw(name, &encoded)?;
    Ok(())
  }

  pub fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
    let raw = match self.store.get_raw(name) {
      Ok(Some(raw)) => raw,
      Ok(None) => return None,
      Err(e) => {
        tracing::debug!(name, error = %e, "could not read persisted value");
        return None;
      }
    };
    match serde_json::from_str(&raw) {
      Ok(value) => Some(value),
      Err(e) => {
        tracing::debug!(name, error = %e, "ignoring malformed persisted value");
        None
      }
    }
  }

  pub fn clear(&self, name: &str) -> Result<(), PersistError> {
    self.store.remove(name)?;
    Ok(())
  }
}
