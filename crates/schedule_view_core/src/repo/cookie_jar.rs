//! In-memory preference store speaking the browser cookie text format.
//!
//! Reads a `Cookie:`-style header (`a=b; c=d`) and writes one
//! `key=value;expires=<date>` line per live preference.

use crate::repo::pref_store::{
    now_epoch_ms, ttl_ms, validate_entry, PrefStore, StoreResult, StoredPref,
};
use chrono::DateTime;
use log::debug;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredCookie {
    value: String,
    expires_at_ms: i64,
}

/// Cookie-jar backed `PrefStore`.
#[derive(Debug, Default)]
pub struct CookieJarStore {
    cookies: RefCell<BTreeMap<String, StoredCookie>>,
}

impl CookieJarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports every `key=value` pair of `header`, each living for `ttl`.
    ///
    /// Segments without `=` or with an unstorable key are skipped; a later
    /// duplicate key replaces an earlier one.
    pub fn from_cookie_header(header: &str, ttl: Duration) -> Self {
        let jar = Self::new();
        for (key, value) in parse_cookie_header(header) {
            if let Err(err) = jar.set(key, value, ttl) {
                debug!("event=cookie_import module=store status=skip key={key} reason={err}");
            }
        }
        jar
    }

    /// Stores `key=value` expiring at an absolute time (epoch ms), e.g. when
    /// copying entries out of another store.
    pub fn set_until(&self, key: &str, value: &str, expires_at_ms: i64) -> StoreResult<()> {
        validate_entry(key, value)?;
        self.cookies.borrow_mut().insert(
            key.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires_at_ms,
            },
        );
        Ok(())
    }

    /// Copies live entries of `prefs`, keeping each entry's own expiry.
    pub fn from_stored(prefs: &[StoredPref]) -> StoreResult<Self> {
        let jar = Self::new();
        for pref in prefs {
            jar.set_until(&pref.key, &pref.value, pref.expires_at_ms)?;
        }
        Ok(jar)
    }

    /// Live cookies as a request header: `a=b; c=d`.
    pub fn cookie_header(&self) -> String {
        let now = now_epoch_ms();
        self.cookies
            .borrow()
            .iter()
            .filter(|(_, cookie)| cookie.expires_at_ms > now)
            .map(|(key, cookie)| format!("{key}={}", cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// One `key=value;expires=<RFC 1123 date>` line per live cookie.
    pub fn set_cookie_lines(&self) -> Vec<String> {
        let now = now_epoch_ms();
        self.cookies
            .borrow()
            .iter()
            .filter(|(_, cookie)| cookie.expires_at_ms > now)
            .map(|(key, cookie)| set_cookie_line(key, &cookie.value, cookie.expires_at_ms))
            .collect()
    }
}

impl PrefStore for CookieJarStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = now_epoch_ms();
        Ok(self
            .cookies
            .borrow()
            .get(key)
            .filter(|cookie| cookie.expires_at_ms > now)
            .map(|cookie| cookie.value.clone()))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.set_until(key, value, now_epoch_ms().saturating_add(ttl_ms(ttl)))
    }

    fn entries(&self) -> StoreResult<Vec<(String, String)>> {
        let now = now_epoch_ms();
        Ok(self
            .cookies
            .borrow()
            .iter()
            .filter(|(_, cookie)| cookie.expires_at_ms > now)
            .map(|(key, cookie)| (key.clone(), cookie.value.clone()))
            .collect())
    }
}

/// Splits `a=b; c=d` into trimmed pairs, skipping segments without `=`.
pub fn parse_cookie_header(header: &str) -> Vec<(&str, &str)> {
    header
        .split(';')
        .filter_map(|segment| {
            let (key, value) = segment.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key, value.trim()))
        })
        .collect()
}

/// `key=value;expires=<RFC 1123 GMT date>` for an absolute expiry.
pub fn set_cookie_line(key: &str, value: &str, expires_at_ms: i64) -> String {
    format!("{key}={value};expires={}", format_cookie_date(expires_at_ms))
}

fn format_cookie_date(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .unwrap_or(DateTime::<chrono::Utc>::MAX_UTC)
        .format(COOKIE_DATE_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_cookie_date, parse_cookie_header, set_cookie_line};

    #[test]
    fn parse_cookie_header_keeps_equals_inside_values() {
        assert_eq!(
            parse_cookie_header("viewmode=agenda; token=a=b;; junk ; =x"),
            [("viewmode", "agenda"), ("token", "a=b")]
        );
        assert!(parse_cookie_header("").is_empty());
    }

    #[test]
    fn set_cookie_line_uses_given_expiry() {
        assert_eq!(
            set_cookie_line("viewmode", "agenda", 4_102_444_800_000),
            "viewmode=agenda;expires=Fri, 01 Jan 2100 00:00:00 GMT"
        );
    }

    #[test]
    fn cookie_dates_use_gmt_rfc_1123() {
        assert_eq!(format_cookie_date(0), "Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(
            format_cookie_date(1_718_409_600_000),
            "Sat, 15 Jun 2024 00:00:00 GMT"
        );
    }
}
