//! HTTP client for a hosted Rozgar backend.
//!
//! Speaks the Supabase-compatible dialect: GoTrue for auth under `/auth/v1`
//! and PostgREST for tables under `/rest/v1`.

mod auth;
mod client;
mod error;
mod query;
mod tables;
mod wire;

pub use client::{RemoteBackend, RemoteConfig};
