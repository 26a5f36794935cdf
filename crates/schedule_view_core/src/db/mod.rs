//! SQLite bootstrap for the preference store.
//!
//! # Responsibility
//! - Open file or in-memory preference databases.
//! - Bring the schema up to date and drop expired preferences before the
//!   connection is handed out.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A database written by a newer build is refused, never downgraded.
//! - Failures surface as `StoreError`, the same type every store call returns.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
