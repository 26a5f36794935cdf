//! Display model for a rendered schedule page.
//!
//! # Responsibility
//! - Describe the page the controller works on: dated entries, week groups,
//!   the root container and its input controls.
//! - Define the small value types persisted as preferences.
//!
//! # Invariants
//! - Classification fields are derived; they are recomputed on every
//!   classification pass and never persisted.

pub mod document;
pub mod view;
