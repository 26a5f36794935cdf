//! Preference store contract and SQLite implementation.

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Expiry applied to every persisted preference (365.24 days).
pub const PERSIST_TTL: Duration = Duration::from_millis(31_556_736_000);

pub const VIEW_MODE_KEY: &str = "viewmode";
pub const SHOW_PAST_KEY: &str = "showpast";
/// Prefix of per-toggle keys: `view_<name>`.
pub const TOGGLE_KEY_PREFIX: &str = "view_";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The preference database was written by a newer build.
    UnsupportedSchema {
        db_version: u32,
        latest_supported: u32,
    },
    /// Key or value cannot be stored or round-tripped through a cookie.
    InvalidEntry(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "preference storage failed: {err}"),
            Self::UnsupportedSchema {
                db_version,
                latest_supported,
            } => write!(
                f,
                "preference schema v{db_version} needs a newer build (this one reads up to v{latest_supported})"
            ),
            Self::InvalidEntry(message) => write!(f, "invalid preference entry: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchema { .. } | Self::InvalidEntry(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// One stored preference with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPref {
    pub key: String,
    pub value: String,
    /// Unix epoch milliseconds after which the entry is gone.
    pub expires_at_ms: i64,
}

/// Textual key/value persistence with per-entry time-to-live.
pub trait PrefStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;
    /// All live entries, ordered by key.
    fn entries(&self) -> StoreResult<Vec<(String, String)>>;
}

/// Key for the visibility of toggle `name`.
pub fn toggle_key(name: &str) -> String {
    format!("{TOGGLE_KEY_PREFIX}{name}")
}

/// Rejects keys and values that would corrupt a `key=value; ...` cookie line.
pub fn validate_entry(key: &str, value: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidEntry("key cannot be empty".to_string()));
    }
    if key.chars().any(|c| c == '=' || c == ';' || c.is_whitespace()) {
        return Err(StoreError::InvalidEntry(format!(
            "key `{key}` contains `=`, `;` or whitespace"
        )));
    }
    if value.contains(';') {
        return Err(StoreError::InvalidEntry(format!(
            "value for `{key}` contains `;`"
        )));
    }
    Ok(())
}

pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn ttl_ms(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

/// Removes rows whose expiry has passed. Also run by `open_db`.
pub(crate) fn delete_expired(conn: &Connection) -> StoreResult<usize> {
    let removed = conn.execute(
        "DELETE FROM preferences WHERE expires_at <= ?1;",
        [now_epoch_ms()],
    )?;
    debug!("event=prefs_purge module=store status=ok removed={removed}");
    Ok(removed)
}

/// SQLite-backed preference store over a migrated connection.
pub struct SqlitePrefStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePrefStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Deletes expired rows; returns how many were removed.
    pub fn purge_expired(&self) -> StoreResult<usize> {
        delete_expired(self.conn)
    }

    /// Live entries with their stored expiry, ordered by key.
    pub fn entries_with_expiry(&self) -> StoreResult<Vec<StoredPref>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value, expires_at FROM preferences
             WHERE expires_at > ?1
             ORDER BY key ASC;",
        )?;
        let rows = stmt.query_map([now_epoch_ms()], |row| {
            Ok(StoredPref {
                key: row.get(0)?,
                value: row.get(1)?,
                expires_at_ms: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl PrefStore for SqlitePrefStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1 AND expires_at > ?2;",
                params![key, now_epoch_ms()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        validate_entry(key, value)?;

        let now = now_epoch_ms();
        self.conn.execute(
            "INSERT INTO preferences (key, value, expires_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at;",
            params![key, value, now.saturating_add(ttl_ms(ttl)), now],
        )?;
        debug!("event=pref_set module=store status=ok backend=sqlite key={key}");
        Ok(())
    }

    fn entries(&self) -> StoreResult<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value FROM preferences
             WHERE expires_at > ?1
             ORDER BY key ASC;",
        )?;
        let rows = stmt.query_map([now_epoch_ms()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}
