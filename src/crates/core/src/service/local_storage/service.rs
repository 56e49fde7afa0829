//! Local storage service
//!
//! The public key-value surface. Every call picks a medium: the Web Storage
//! area when it is usable, otherwise the cookie backend. A failing Web
//! Storage call falls back to cookies for that call only. Failures reach the
//! host as signals; no operation returns an error.

use super::codec::{Decoded, Encoded, ExpiryCodec, ExpiryRequest};
use super::cookie_backend::CookieBackend;
use super::namespace::KeyNamespace;
use super::web_storage::WebStorage;
use crate::infrastructure::storage::Backends;
use crate::service::config::StorageConfig;
use crate::util::clock::{Clock, SystemClock};
use crate::util::errors::StashError;
use log::{debug, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stashkit_core_types::{StorageSignal, StorageType, LOCAL_STORAGE_NOT_SUPPORTED};
use stashkit_transport::SignalSink;
use std::sync::Arc;

/// Outcome of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Never stored, removed, or stored as null. These are indistinguishable.
    Null,
    Value(Value),
    /// The entry existed but its expiry had passed; it has now been deleted.
    Expired,
}

impl Lookup {
    pub fn from_value(value: Value) -> Self {
        if value.is_null() {
            Lookup::Null
        } else {
            Lookup::Value(value)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Lookup::Null)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Lookup::Expired)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Lookup::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Value(value) => Some(value),
            _ => None,
        }
    }
}

pub struct LocalStorageService {
    config: StorageConfig,
    namespace: KeyNamespace,
    codec: ExpiryCodec,
    /// Present only when the configured area exists and passed its probe.
    web: Option<WebStorage>,
    storage_type: StorageType,
    cookies: CookieBackend,
    sink: Arc<dyn SignalSink>,
    clock: Arc<dyn Clock>,
}

impl LocalStorageService {
    pub fn new(config: StorageConfig, backends: Backends, sink: Arc<dyn SignalSink>) -> Self {
        Self::with_clock(config, backends, sink, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: StorageConfig,
        backends: Backends,
        sink: Arc<dyn SignalSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let namespace = KeyNamespace::new(&config.prefix);
        let codec = ExpiryCodec::new(
            config.expiry_field.clone(),
            config.expiry.default_duration_ms,
            config.expiry.always_expire,
        );

        let mut storage_type = config.storage_type;
        let web = match backends.area(storage_type) {
            Some(area) => match WebStorage::probe(area, storage_type, namespace.clone()) {
                Ok(web) => Some(web),
                Err(e) => {
                    warn!(
                        "Storage area unusable, falling back to cookies: storage_type={}, error={}",
                        storage_type, e
                    );
                    sink.emit(StorageSignal::error(e.to_string()));
                    storage_type = StorageType::Cookie;
                    None
                }
            },
            None => {
                if storage_type.is_web_storage() {
                    warn!("Storage area not available: storage_type={}", storage_type);
                }
                None
            }
        };

        let cookies = CookieBackend::new(
            backends.cookies.clone(),
            namespace.clone(),
            &config,
            sink.clone(),
            clock.clone(),
        );

        debug!(
            "Local storage service initialized: prefix={}, storage_type={}, web_storage={}, cookies={}",
            namespace.prefix(),
            storage_type,
            web.is_some(),
            cookies.is_supported()
        );

        Self {
            config,
            namespace,
            codec,
            web,
            storage_type,
            cookies,
            sink,
            clock,
        }
    }

    /// Whether the configured Web Storage area is in use.
    pub fn is_supported(&self) -> bool {
        self.web.is_some()
    }

    /// Active storage type; `Cookie` after a failed probe.
    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn derive_key(&self, key: &str) -> String {
        self.namespace.qualify(key)
    }

    /// The cookie backend, for direct cookie access.
    pub fn cookie(&self) -> &CookieBackend {
        &self.cookies
    }

    /// Web Storage when usable. Warns when it is unusable for a reason other
    /// than being configured for cookies.
    fn primary(&self) -> Option<&WebStorage> {
        if self.web.is_none() && self.config.storage_type.is_web_storage() {
            self.sink
                .emit(StorageSignal::warning(LOCAL_STORAGE_NOT_SUPPORTED));
        }
        self.web.as_ref()
    }

    fn emit_error(&self, error: &StashError) {
        self.sink.emit(StorageSignal::error(error.to_string()));
    }

    fn notify_set(&self, key: &str, encoded: &Encoded, storage_type: StorageType) {
        if self.config.notify.set_item {
            self.sink.emit(StorageSignal::SetItem {
                key: key.to_string(),
                new_value: encoded.payload.clone(),
                storage_type,
            });
        }
    }

    fn notify_remove(&self, key: &str, storage_type: StorageType) {
        if self.config.notify.remove_item {
            self.sink.emit(StorageSignal::RemoveItem {
                key: key.to_string(),
                storage_type,
            });
        }
    }

    /// Store `value` under `key`. `None` stores the null tombstone.
    ///
    /// Returns `false` only when the write ended up on the cookie backend and
    /// that failed.
    pub fn set(&self, key: &str, value: impl Into<Option<Value>>, expiry: ExpiryRequest) -> bool {
        let value = value.into();
        let now = self.clock.now_millis();
        let encoded = match self.codec.encode(value.as_ref(), expiry, now) {
            Ok(encoded) => encoded,
            Err(e) => {
                self.emit_error(&e);
                return false;
            }
        };
        let days = encoded.days_to_expiry(now);

        let Some(web) = self.primary() else {
            self.notify_set(key, &encoded, StorageType::Cookie);
            return self.cookies.set(key, Some(&encoded.cookie_value()), days);
        };

        match web.set_item(key, encoded.storage_text()) {
            Ok(()) => {
                self.notify_set(key, &encoded, web.storage_type());
                true
            }
            Err(e) => {
                debug!("Web storage write failed, using cookie: key={}, error={}", key, e);
                self.emit_error(&e);
                self.cookies.set(key, Some(&encoded.cookie_value()), days)
            }
        }
    }

    /// Serialize and store any serde value.
    pub fn set_json<T: serde::Serialize>(&self, key: &str, value: &T, expiry: ExpiryRequest) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.set(key, value, expiry),
            Err(e) => {
                self.emit_error(&StashError::from(e));
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Lookup {
        self.get_with_expiry(key, ExpiryRequest::Never)
    }

    /// Read `key`, attaching `force` expiry to an item stored without one.
    pub fn get_with_expiry(&self, key: &str, force: ExpiryRequest) -> Lookup {
        let Some(web) = self.primary() else {
            return match self.cookies.get(key) {
                Some(item) => self.resolve(key, item, force, None),
                None => Lookup::Null,
            };
        };

        let raw = match web.get_item(key) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Web storage read failed, using cookie: key={}, error={}", key, e);
                self.emit_error(&e);
                return match self.cookies.get(key) {
                    Some(item) => self.resolve(key, item, force, None),
                    None => Lookup::Null,
                };
            }
        };

        match raw.as_deref() {
            None => match self.cookies.peek(key) {
                // Left behind by a write that fell back to cookies.
                Some(item) => self.resolve(key, item, force, None),
                None => Lookup::Null,
            },
            Some("") | Some("null") => Lookup::Null,
            Some(text) => {
                let decoded = self.codec.decode(text, force, self.clock.now_millis());
                self.finish(key, decoded, Some(web))
            }
        }
    }

    /// Read and deserialize `key`; `None` unless a value is present and fits `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).into_value()?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                debug!("Stored value does not match requested type: key={}, error={}", key, e);
                None
            }
        }
    }

    fn resolve(&self, key: &str, item: Value, force: ExpiryRequest, web: Option<&WebStorage>) -> Lookup {
        if item.is_null() {
            return Lookup::Null;
        }
        let decoded = self
            .codec
            .decode_value(item, force, self.clock.now_millis());
        self.finish(key, decoded, web)
    }

    fn finish(&self, key: &str, decoded: Decoded, web: Option<&WebStorage>) -> Lookup {
        if decoded.expired {
            debug!("Entry expired, deleting: key={}", key);
            match web {
                Some(web) => {
                    if let Err(e) = web.remove_item(key) {
                        self.emit_error(&e);
                        self.cookies.remove(key);
                    }
                }
                None => {
                    self.cookies.remove(key);
                }
            }
            return Lookup::Expired;
        }

        if let Some(rewrite) = decoded.rewrite {
            debug!("Rewriting entry with expiry: key={}, expiry={:?}", key, rewrite);
            self.set(key, decoded.value.clone(), rewrite);
        }
        Lookup::from_value(decoded.value)
    }

    /// Remove each of `keys`.
    pub fn remove<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.remove_one(key.as_ref());
        }
    }

    fn remove_one(&self, key: &str) {
        let Some(web) = self.primary() else {
            self.notify_remove(key, StorageType::Cookie);
            self.cookies.remove(key);
            return;
        };

        match web.remove_item(key) {
            Ok(()) => {
                self.notify_remove(key, web.storage_type());
                if self.cookies.peek(key).is_some() {
                    self.cookies.remove(key);
                }
            }
            Err(e) => {
                debug!("Web storage remove failed, using cookie: key={}, error={}", key, e);
                self.emit_error(&e);
                self.cookies.remove(key);
            }
        }
    }

    /// Application keys stored in Web Storage under this namespace. Cookies
    /// are not enumerated.
    pub fn keys(&self) -> Vec<String> {
        let Some(web) = self.web.as_ref() else {
            self.sink
                .emit(StorageSignal::warning(LOCAL_STORAGE_NOT_SUPPORTED));
            return Vec::new();
        };
        match web.keys() {
            Ok(keys) => keys,
            Err(e) => {
                self.emit_error(&e);
                Vec::new()
            }
        }
    }

    /// Remove every entry in this namespace, or only those whose application
    /// key matches `pattern`.
    ///
    /// Without usable Web Storage, or when a removal fails, every cookie in
    /// the namespace is cleared instead; the pattern does not apply there.
    pub fn clear_all(&self, pattern: Option<&str>) -> bool {
        let matcher = match pattern.filter(|p| !p.is_empty()).map(Regex::new).transpose() {
            Ok(matcher) => matcher,
            Err(e) => {
                self.emit_error(&StashError::from(e));
                return false;
            }
        };

        let Some(web) = self.primary() else {
            return self.cookies.clear_all();
        };

        let keys = match web.keys() {
            Ok(keys) => keys,
            Err(e) => {
                self.emit_error(&e);
                return self.cookies.clear_all();
            }
        };

        let mut removed = 0;
        for key in keys {
            if let Some(matcher) = &matcher {
                if !matcher.is_match(&key) {
                    continue;
                }
            }
            if let Err(e) = web.remove_item(&key) {
                warn!("Clear failed, clearing cookies instead: key={}, error={}", key, e);
                self.emit_error(&e);
                return self.cookies.clear_all();
            }
            self.notify_remove(&key, web.storage_type());
            removed += 1;
        }
        debug!("Cleared {} item(s): pattern={:?}", removed, pattern);
        true
    }

    /// Number of Web Storage entries in this namespace.
    pub fn length(&self) -> usize {
        let Some(web) = self.web.as_ref() else {
            self.sink
                .emit(StorageSignal::warning(LOCAL_STORAGE_NOT_SUPPORTED));
            return 0;
        };
        match web.length() {
            Ok(len) => len,
            Err(e) => {
                self.emit_error(&e);
                0
            }
        }
    }
}
