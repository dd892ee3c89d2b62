//! Core types and trait definitions for the Rozgar job board.
//!
//! This crate is free of HTTP and database dependencies. The backends
//! (`rozgar-store-sqlite`, `rozgar-remote`) implement the traits in
//! [`backend`]; the client layer (`rozgar-app`) consumes them.

// Native `async fn` in traits; the trait signatures spell out `Send` bounds
// on the returned futures themselves.
#![allow(async_fn_in_trait)]

pub mod admin;
pub mod application;
pub mod backend;
pub mod error;
pub mod identity;
pub mod job;
pub mod profile;

pub use backend::{AuthBackend, Backend, Tables};
pub use error::{Error, Result};
