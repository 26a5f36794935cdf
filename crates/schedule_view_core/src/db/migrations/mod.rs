//! Preference schema versions and the upgrade step.
//!
//! Pending scripts run in one transaction; `user_version` is bumped to the
//! latest version in that same transaction.

use crate::repo::pref_store::{StoreError, StoreResult};
use rusqlite::Connection;

/// `(version, script)` in strictly increasing version order.
const SCHEMA_SCRIPTS: &[(u32, &str)] = &[(1, include_str!("0001_preferences.sql"))];

/// Outcome of one `migrate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
}

impl MigrationReport {
    pub fn upgraded(&self) -> bool {
        self.from_version != self.to_version
    }
}

/// Latest schema version this build can create and read.
pub fn latest_version() -> u32 {
    SCHEMA_SCRIPTS.last().map_or(0, |(version, _)| *version)
}

/// Schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> StoreResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Runs every script newer than the recorded schema version.
///
/// # Errors
/// - `StoreError::UnsupportedSchema` when the database is newer than this build.
pub fn migrate(conn: &mut Connection) -> StoreResult<MigrationReport> {
    let from_version = schema_version(conn)?;
    let to_version = latest_version();
    if from_version > to_version {
        return Err(StoreError::UnsupportedSchema {
            db_version: from_version,
            latest_supported: to_version,
        });
    }

    let report = MigrationReport {
        from_version,
        to_version,
    };
    if !report.upgraded() {
        return Ok(report);
    }

    let tx = conn.transaction()?;
    for (_, script) in SCHEMA_SCRIPTS
        .iter()
        .filter(|(version, _)| *version > from_version)
    {
        tx.execute_batch(script)?;
    }
    tx.pragma_update(None, "user_version", to_version)?;
    tx.commit()?;

    Ok(report)
}
