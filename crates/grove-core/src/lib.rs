//! grove-core: data model, eligibility windows, SQLite store, and the
//! completion engine for the grove habit tracker.
//!
//! The crate is organized around one central operation: a user completes a
//! recurring task ([`engine::complete_task`]), which awards points to the
//! user and optionally to their group. Everything else is the catalog and
//! membership plumbing around that operation.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at module seams, `anyhow::Result` with
//!   context at IO boundaries, stable machine codes in [`error::ErrorCode`].
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Time**: UTC everywhere; persisted timestamps are integer microseconds
//!   since the Unix epoch (`*_at_us` columns).
//! - **Storage**: the SQLite handle is constructed by the caller via
//!   [`db::open_store`] and passed in explicitly; there is no ambient
//!   global connection.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;
pub mod window;
