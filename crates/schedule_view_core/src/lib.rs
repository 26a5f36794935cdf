//! Core of the schedule view controller.
//!
//! Classifies calendar entries as past/future/today, derives the hide rules
//! for the active visibility toggles, and persists view preferences so the
//! last session's layout is restored on the next load.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod style;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{Control, ControlKind, Document, Entry, Group, Node};
pub use model::view::{Category, InvalidToggleName, ToggleName, ViewMode};
pub use repo::cookie_jar::{parse_cookie_header, set_cookie_line, CookieJarStore};
pub use repo::pref_store::{
    PrefStore, SqlitePrefStore, StoreError, StoreResult, StoredPref, PERSIST_TTL,
};
pub use service::classify::{
    classify_entries, classify_groups, reference_date_today, ClassificationSummary,
};
pub use service::view_state_service::{
    AppState, RestoreSummary, ViewError, ViewResult, ViewStateService,
};
pub use style::{render_hide_rules, render_stylesheet, VisibilityState, PAST_HIDE_RULES};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
