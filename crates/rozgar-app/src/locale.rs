//! Display-language selection and string lookup.

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{
  persist::{LANGUAGE, Persistence},
  strings::STRINGS,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Language {
  #[default]
  #[serde(rename = "hi")]
  Hindi,
  #[serde(rename = "en")]
  English,
}

impl Language {
  pub fn code(self) -> &'static str {
    match self {
      Self::Hindi => "hi",
      Self::English => "en",
    }
  }

  pub fn other(self) -> Self {
    match self {
      Self::Hindi => Self::English,
      Self::English => Self::Hindi,
    }
  }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.code()) }
}

impl FromStr for Language {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "hi" => Ok(Self::Hindi),
      "en" => Ok(Self::English),
      other => Err(format!("unknown language code: {other:?}")),
    }
  }
}

// ─── String table ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct Entry {
  hi: Option<String>,
  en: Option<String>,
}

impl Entry {
  fn get(&self, language: Language) -> Option<&str> {
    match language {
      Language::Hindi => self.hi.as_deref(),
      Language::English => self.en.as_deref(),
    }
  }
}

/// Key → per-language text.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
  entries: HashMap<String, Entry>,
}

impl StringTable {
  pub fn new() -> Self { Self::default() }

  /// The table shipped with the application.
  pub fn builtin() -> Self {
    let mut table = Self::new();
    for (key, hi, en) in STRINGS {
      table.insert(key, Language::Hindi, hi);
      table.insert(key, Language::English, en);
    }
    table
  }

  pub fn insert(&mut self, key: &str, language: Language, text: &str) {
    let entry = self.entries.entry(key.to_owned()).or_default();
    let slot = match language {
      Language::Hindi => &mut entry.hi,
      Language::English => &mut entry.en,
    };
    *slot = Some(text.to_owned());
  }

  pub fn get(&self, key: &str, language: Language) -> Option<&str> {
    self.entries.get(key)?.get(language)
  }
}

// ─── Locale ──────────────────────────────────────────────────────────────────

struct Shared {
  table:       StringTable,
  language:    watch::Sender<Language>,
  persistence: Persistence,
}

/// The active language plus the table it selects from.
///
/// Clones share one selection: a language set through any clone is seen by
/// all of them at once.
#[derive(Clone)]
pub struct Locale {
  shared: Arc<Shared>,
}

impl Locale {
  /// Start from the persisted language (Hindi if none) and the built-in
  /// table.
  pub fn load(persistence: Persistence) -> Self {
    Self::with_table(persistence, StringTable::builtin())
  }

  pub fn with_table(persistence: Persistence, table: StringTable) -> Self {
    let initial = persistence.load::<Language>(LANGUAGE).unwrap_or_default();
    let (language, _) = watch::channel(initial);
    Self { shared: Arc::new(Shared { table, language, persistence }) }
  }

  pub fn language(&self) -> Language { *self.shared.language.borrow() }

  /// Select `language` and persist the choice.
  pub fn set_language(&self, language: Language) {
    self.shared.language.send_replace(language);
    if let Err(e) = self.shared.persistence.save(LANGUAGE, &language) {
      tracing::warn!(error = %e, "could not persist language choice");
    }
  }

  /// Switch to the other language. Returns the new selection.
  pub fn toggle(&self) -> Language {
    let next = self.language().other();
    self.set_language(next);
    next
  }

  pub fn subscribe(&self) -> watch::Receiver<Language> { self.shared.language.subscribe() }

  /// Text for `key` in the active language, else in the other one, else the
  /// key itself.
  pub fn translate(&self, key: &str) -> String {
    let language = self.language();
    let table = &self.shared.table;
    match table.get(key, language).or_else(|| table.get(key, language.other())) {
      Some(text) => text.to_owned(),
      None => {
        tracing::warn!(key, "translation missing");
        key.to_owned()
      }
    }
  }
}
