//! Cookie document
//!
//! The host's cookie store, seen the way page scripts see it: one getter that
//! returns every visible cookie as `name=value; name2=value2`, and one setter
//! that takes a single `name=value; attr=...` assignment per call.

pub mod jar;

pub use jar::CookieJar;

use crate::util::errors::StashResult;

pub trait CookieDocument: Send + Sync {
    /// Whether the platform reports cookies as enabled.
    fn cookies_enabled(&self) -> bool;

    fn cookie_string(&self) -> StashResult<String>;

    fn write_cookie(&self, assignment: &str) -> StashResult<()>;
}

/// `expires` attribute format (RFC 1123, always GMT).
pub const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Latest `expires` date a cookie can carry: 9999-12-31T23:59:59Z.
pub const MAX_COOKIE_DATE_MILLIS: i64 = 253_402_300_799_000;

/// Render epoch milliseconds as a cookie `expires` date, clamped to
/// `1970-01-01..=MAX_COOKIE_DATE_MILLIS`.
pub fn format_cookie_date(epoch_millis: i64) -> String {
    let clamped = epoch_millis.clamp(0, MAX_COOKIE_DATE_MILLIS);
    let date = chrono::DateTime::from_timestamp_millis(clamped).unwrap_or_default();
    date.format(COOKIE_DATE_FORMAT).to_string()
}

/// Parse a cookie `expires` date into epoch milliseconds.
pub fn parse_cookie_date(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value) {
        return Some(date.timestamp_millis());
    }
    chrono::NaiveDateTime::parse_from_str(value, COOKIE_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}
