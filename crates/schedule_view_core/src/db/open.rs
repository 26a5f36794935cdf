//! Connection opening and per-connection setup.

use super::migrations::{migrate, MigrationReport};
use crate::repo::pref_store::{delete_expired, StoreError, StoreResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the preference database at `path`.
///
/// The returned connection is migrated to the latest schema and holds no
/// expired preferences.
pub fn open_db(path: impl AsRef<Path>) -> StoreResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory preference database, ready for use.
pub fn open_db_in_memory() -> StoreResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<Connection> {
    let started_at = Instant::now();

    let mut conn = connect().map_err(|err| {
        error!("event=db_open module=db status=error mode={mode} stage=connect error={err}");
        StoreError::from(err)
    })?;

    match prepare(&mut conn) {
        Ok((report, purged)) => {
            info!(
                "event=db_open module=db status=ok mode={} schema_from={} schema_to={} purged={} duration_ms={}",
                mode,
                report.from_version,
                report.to_version,
                purged,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} stage=prepare duration_ms={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn prepare(conn: &mut Connection) -> StoreResult<(MigrationReport, usize)> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let report = migrate(conn)?;
    let purged = delete_expired(conn)?;
    Ok((report, purged))
}
