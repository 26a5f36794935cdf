//! Use-case services driving the page.
//!
//! # Responsibility
//! - Classify entries and groups from a reference date.
//! - Apply and replay view preferences through a `PrefStore`.

pub mod classify;
pub mod view_state_service;
