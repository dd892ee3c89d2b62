//! SQLite backend for Rozgar.
//!
//! Implements both halves of the backend collaborator (auth and tables) in
//! process, so the client runs without a hosted service. Wraps
//! [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod auth;
mod encode;
mod schema;
mod seed;
mod tables;

pub mod backend;
pub mod error;
pub mod sender;

pub use backend::SqliteBackend;
pub use error::{Error, Result};
pub use sender::{CodeSender, LogSender};

#[cfg(test)]
mod tests;
