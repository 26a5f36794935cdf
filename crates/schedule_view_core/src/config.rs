//! Runtime configuration resolved from the environment.
//!
//! Explicit values (e.g. CLI flags) are layered on top by the caller.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "SCHEDULE_VIEW_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "SCHEDULE_VIEW_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "SCHEDULE_VIEW_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "schedule_view.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file holding persisted preferences.
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}
