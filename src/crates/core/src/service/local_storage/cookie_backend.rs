//! Cookie backend
//!
//! Key-value operations over the cookie document. Serves as the primary
//! medium when the service is configured for cookies, and as the fallback
//! whenever Web Storage is unusable.

use super::namespace::KeyNamespace;
use crate::infrastructure::cookies::{format_cookie_date, CookieDocument};
use crate::service::config::StorageConfig;
use crate::util::clock::{Clock, ONE_DAY_MILLISECONDS};
use crate::util::errors::StashResult;
use log::{debug, trace};
use serde_json::Value;
use stashkit_core_types::{StorageSignal, COOKIES_NOT_SUPPORTED};
use stashkit_transport::SignalSink;
use std::sync::Arc;

pub struct CookieBackend {
    document: Arc<dyn CookieDocument>,
    namespace: KeyNamespace,
    path: String,
    domain: Option<String>,
    default_duration_ms: i64,
    supported: bool,
    sink: Arc<dyn SignalSink>,
    clock: Arc<dyn Clock>,
}

impl CookieBackend {
    pub fn new(
        document: Arc<dyn CookieDocument>,
        namespace: KeyNamespace,
        config: &StorageConfig,
        sink: Arc<dyn SignalSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let supported = match Self::probe(document.as_ref()) {
            Ok(supported) => supported,
            Err(e) => {
                sink.emit(StorageSignal::error(e.to_string()));
                false
            }
        };
        debug!("Cookie backend initialized: supported={}", supported);

        Self {
            document,
            namespace,
            path: config.cookie.path.clone(),
            domain: config.cookie.domain.clone(),
            default_duration_ms: config.expiry.default_duration_ms,
            supported,
            sink,
            clock,
        }
    }

    /// Cookies count as supported when the platform says so, or when a test
    /// cookie written to the document can be read back.
    pub fn probe(document: &dyn CookieDocument) -> StashResult<bool> {
        if document.cookies_enabled() {
            return Ok(true);
        }
        if !document.cookie_string()?.is_empty() {
            return Ok(true);
        }
        document.write_cookie("test")?;
        Ok(document.cookie_string()?.contains("test"))
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Write `value` under `key`.
    ///
    /// `None` is an unset value and fails. Null deletes the cookie by writing
    /// it already expired. Strings are stored as-is, anything else as JSON.
    /// A non-zero `days_to_expiry` wins over the default duration; with
    /// neither, a session cookie is written.
    pub fn set(&self, key: &str, value: Option<&Value>, days_to_expiry: f64) -> bool {
        let Some(value) = value else {
            return false;
        };
        if !self.supported {
            self.sink.emit(StorageSignal::error(COOKIES_NOT_SUPPORTED));
            return false;
        }

        let now = self.clock.now_millis();
        let (text, expires_at) = match value {
            Value::Null => (String::new(), Some(now.saturating_sub(ONE_DAY_MILLISECONDS))),
            other => {
                let text = match other {
                    Value::String(s) => s.clone(),
                    json => json.to_string(),
                };
                let expires_at = if days_to_expiry != 0.0 && days_to_expiry.is_finite() {
                    // `as` saturates out-of-range lifetimes.
                    let lifetime = (days_to_expiry * ONE_DAY_MILLISECONDS as f64).round() as i64;
                    Some(now.saturating_add(lifetime))
                } else if self.default_duration_ms != 0 {
                    Some(now.saturating_add(self.default_duration_ms))
                } else {
                    None
                };
                (text, expires_at)
            }
        };

        if key.is_empty() {
            return true;
        }

        let mut assignment = format!(
            "{}={}",
            self.namespace.qualify(key),
            urlencoding::encode(&text)
        );
        if let Some(at) = expires_at {
            assignment.push_str("; expires=");
            assignment.push_str(&format_cookie_date(at));
        }
        assignment.push_str("; path=");
        assignment.push_str(&self.path);
        if let Some(domain) = &self.domain {
            assignment.push_str("; domain=");
            assignment.push_str(domain);
        }

        match self.document.write_cookie(&assignment) {
            Ok(()) => true,
            Err(e) => {
                self.sink.emit(StorageSignal::error(e.to_string()));
                false
            }
        }
    }

    /// Read `key`. The stored text is URL-decoded and parsed as JSON when it
    /// parses; otherwise the decoded string is returned.
    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.supported {
            self.sink.emit(StorageSignal::error(COOKIES_NOT_SUPPORTED));
            return None;
        }
        match self.lookup(key) {
            Ok(value) => value,
            Err(e) => {
                self.sink.emit(StorageSignal::error(e.to_string()));
                None
            }
        }
    }

    /// Read without emitting signals; `None` when unsupported or absent.
    pub(crate) fn peek(&self, key: &str) -> Option<Value> {
        if !self.supported {
            return None;
        }
        self.lookup(key).ok().flatten()
    }

    fn lookup(&self, key: &str) -> StashResult<Option<Value>> {
        let cookies = self.document.cookie_string()?;
        let needle = format!("{}=", self.namespace.qualify(key));

        for segment in cookies.split(';') {
            let segment = segment.trim_start_matches(' ');
            if let Some(rest) = segment.strip_prefix(needle.as_str()) {
                let decoded = urlencoding::decode(rest)
                    .map(|text| text.into_owned())
                    .unwrap_or_else(|_| rest.to_string());
                let value = serde_json::from_str(&decoded).unwrap_or(Value::String(decoded));
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    pub fn remove(&self, key: &str) -> bool {
        self.set(key, Some(&Value::Null), 0.0)
    }

    /// Remove every cookie in this namespace.
    pub fn clear_all(&self) -> bool {
        if !self.supported {
            self.sink.emit(StorageSignal::error(COOKIES_NOT_SUPPORTED));
            return false;
        }
        let cookies = match self.document.cookie_string() {
            Ok(cookies) => cookies,
            Err(e) => {
                self.sink.emit(StorageSignal::error(e.to_string()));
                return false;
            }
        };

        let names: Vec<String> = cookies
            .split(';')
            .map(|segment| segment.trim_start_matches(' '))
            .filter_map(|segment| segment.split_once('=').map(|(name, _)| name.to_string()))
            .collect();

        let mut removed = 0;
        for name in &names {
            match self.namespace.strip(name) {
                Some(key) => {
                    self.remove(key);
                    removed += 1;
                }
                None => trace!("Skipping foreign cookie: {}", name),
            }
        }
        debug!("Cleared {} cookie(s) from namespace '{}'", removed, self.namespace.prefix());
        true
    }
}
