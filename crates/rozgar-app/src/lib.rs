//! Session, role and locale layer for the Rozgar job board.
//!
//! Generic over any [`rozgar_core::Backend`]. Build an [`App`] at startup and
//! pass it by reference; [`App::shutdown`] stops its background tasks.

pub mod applications;
pub mod config;
pub mod context;
pub mod jobs;
pub mod locale;
pub mod notify;
pub mod outcome;
pub mod persist;
pub mod router;
pub mod session;
mod strings;

pub use context::App;
pub use locale::{Language, Locale};
pub use outcome::{Failure, Outcome};
pub use router::View;

#[cfg(test)]
mod tests;
