//! # fastdata-store
//!
//! Local mirror of remote FastData state, backed by SQLite.
//!
//! The indexer is the source of truth. This crate only keeps the last known
//! copy of per-account data (currently the "following" list) so the client
//! can keep working while the indexer is unreachable. The crate exposes a
//! synchronous `Database` handle that wraps a `rusqlite::Connection`.

pub mod database;
pub mod migrations;
pub mod mirror;
pub mod models;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use mirror::following_key;
pub use models::*;
