use super::{parse_cookie_date, CookieDocument};
use crate::util::clock::{Clock, SystemClock};
use crate::util::errors::{StashError, StashResult};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCookie {
    value: String,
    /// Epoch millis; `None` for a session cookie.
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

/// Cookie store with browser-like assignment semantics.
///
/// Cookies are identified by name. An assignment whose `expires` lies in the
/// past deletes the cookie. When opened from a file, cookies with an expiry
/// date are persisted; session cookies end with the process.
pub struct CookieJar {
    cookies: Mutex<IndexMap<String, StoredCookie>>,
    enabled: bool,
    clock: Arc<dyn Clock>,
    persist_path: Option<PathBuf>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            cookies: Mutex::new(IndexMap::new()),
            enabled: true,
            clock,
            persist_path: None,
        }
    }

    /// A jar on a platform with cookies turned off: every call fails.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> StashResult<Self> {
        let path = path.as_ref().to_path_buf();
        let cookies: IndexMap<String, StoredCookie> = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                IndexMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            IndexMap::new()
        };
        debug!(
            "Opened cookie jar: path={}, cookies={}",
            path.display(),
            cookies.len()
        );

        Ok(Self {
            cookies: Mutex::new(cookies),
            enabled: true,
            clock,
            persist_path: Some(path),
        })
    }

    /// Raw value of a live cookie, without the document-level parsing.
    pub fn value_of(&self, name: &str) -> Option<String> {
        let now = self.clock.now_millis();
        let cookies = self.cookies.lock().ok()?;
        cookies
            .get(name)
            .filter(|c| !is_expired(c, now))
            .map(|c| c.value.clone())
    }

    /// `path` attribute recorded for a live cookie.
    pub fn path_of(&self, name: &str) -> Option<String> {
        let cookies = self.cookies.lock().ok()?;
        cookies.get(name).and_then(|c| c.path.clone())
    }

    /// `domain` attribute recorded for a live cookie.
    pub fn domain_of(&self, name: &str) -> Option<String> {
        let cookies = self.cookies.lock().ok()?;
        cookies.get(name).and_then(|c| c.domain.clone())
    }

    /// Expiry recorded for a live cookie; `Some(None)` for a session cookie.
    pub fn expiry_of(&self, name: &str) -> Option<Option<i64>> {
        let cookies = self.cookies.lock().ok()?;
        cookies.get(name).map(|c| c.expires_at)
    }

    pub fn len(&self) -> usize {
        let now = self.clock.now_millis();
        self.cookies
            .lock()
            .map(|c| c.values().filter(|c| !is_expired(c, now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_enabled(&self) -> StashResult<()> {
        if !self.enabled {
            return Err(StashError::CookiesUnsupported);
        }
        Ok(())
    }

    fn persist(&self, cookies: &IndexMap<String, StoredCookie>) -> StashResult<()> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        let durable: IndexMap<&String, &StoredCookie> = cookies
            .iter()
            .filter(|(_, c)| c.expires_at.is_some())
            .collect();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&durable)?.as_bytes())?;
        Ok(())
    }
}

fn is_expired(cookie: &StoredCookie, now: i64) -> bool {
    cookie.expires_at.map(|at| at <= now).unwrap_or(false)
}

impl CookieDocument for CookieJar {
    fn cookies_enabled(&self) -> bool {
        self.enabled
    }

    fn cookie_string(&self) -> StashResult<String> {
        self.ensure_enabled()?;
        let now = self.clock.now_millis();
        let mut cookies = self
            .cookies
            .lock()
            .map_err(|_| StashError::backend("cookie jar lock poisoned"))?;
        cookies.retain(|_, c| !is_expired(c, now));

        let rendered = cookies
            .iter()
            .map(|(name, c)| {
                if name.is_empty() {
                    c.value.clone()
                } else {
                    format!("{}={}", name, c.value)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        Ok(rendered)
    }

    fn write_cookie(&self, assignment: &str) -> StashResult<()> {
        self.ensure_enabled()?;
        let now = self.clock.now_millis();

        let mut segments = assignment.split(';');
        let pair = segments.next().unwrap_or_default().trim();
        // A bare token without `=` is a cookie with an empty name.
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
            None => (String::new(), pair.to_string()),
        };

        let mut cookie = StoredCookie {
            value,
            expires_at: None,
            path: None,
            domain: None,
        };
        let mut max_age: Option<i64> = None;

        for attribute in segments {
            let (attr, attr_value) = match attribute.split_once('=') {
                Some((a, v)) => (a.trim().to_lowercase(), v.trim()),
                None => (attribute.trim().to_lowercase(), ""),
            };
            match attr.as_str() {
                "expires" => match parse_cookie_date(attr_value) {
                    Some(at) => cookie.expires_at = Some(at),
                    None => warn!("Ignoring unparseable cookie expiry: {}", attr_value),
                },
                "max-age" => max_age = attr_value.parse::<i64>().ok(),
                "path" => cookie.path = Some(attr_value.to_string()),
                "domain" => cookie.domain = Some(attr_value.to_string()),
                other => trace!("Ignoring cookie attribute: {}", other),
            }
        }
        // Max-Age wins over Expires.
        if let Some(seconds) = max_age {
            cookie.expires_at = Some(now.saturating_add(seconds.saturating_mul(1000)));
        }

        let mut cookies = self
            .cookies
            .lock()
            .map_err(|_| StashError::backend("cookie jar lock poisoned"))?;
        if is_expired(&cookie, now) {
            trace!("Cookie deleted by past expiry: name={}", name);
            cookies.shift_remove(&name);
        } else {
            cookies.insert(name, cookie);
        }
        self.persist(&cookies)
    }
}
