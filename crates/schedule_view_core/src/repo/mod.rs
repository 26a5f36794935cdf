//! Preference persistence: typed key/value storage with expiry.
//!
//! # Responsibility
//! - Define the `PrefStore` contract used by the view controller.
//! - Provide SQLite and cookie-jar backends.
//!
//! # Invariants
//! - Expired values are never returned.
//! - `entries()` is ordered by key so replay is deterministic.

pub mod cookie_jar;
pub mod pref_store;
