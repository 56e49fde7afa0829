//! Storage configuration
//!
//! Built once before the storage service is constructed; the service keeps
//! its own copy and never changes it.

use crate::infrastructure::cookies::MAX_COOKIE_DATE_MILLIS;
use crate::util::clock::ONE_DAY_MILLISECONDS;
use crate::util::errors::{StashError, StashResult};
use log::warn;
use serde::{Deserialize, Serialize};
use stashkit_core_types::StorageType;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PREFIX: &str = "ls";
pub const DEFAULT_EXPIRY_FIELD: &str = "__expiry";
pub const DEFAULT_EXPIRY_MS: i64 = 2 * 60 * 60 * 1000;
pub const DEFAULT_COOKIE_PATH: &str = "/";
/// Longest default duration; anything beyond outlives every cookie date.
pub const MAX_EXPIRY_MS: i64 = MAX_COOKIE_DATE_MILLIS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpiryConfig {
    /// Duration applied when a write asks for the default expiry. Zero
    /// makes cookies written without an explicit lifetime session cookies.
    pub default_duration_ms: i64,
    /// Wrap every write with an expiry, requested or not.
    pub always_expire: bool,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_EXPIRY_MS,
            always_expire: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieConfig {
    pub path: String,
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_COOKIE_PATH.to_string(),
            domain: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyConfig {
    pub set_item: bool,
    pub remove_item: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            set_item: true,
            remove_item: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Namespace for every key. A separator is appended when missing.
    pub prefix: String,
    pub storage_type: StorageType,
    /// Name of the field carrying the expiry timestamp in wrapped values.
    pub expiry_field: String,
    pub expiry: ExpiryConfig,
    pub cookie: CookieConfig,
    pub notify: NotifyConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            storage_type: StorageType::default(),
            expiry_field: DEFAULT_EXPIRY_FIELD.to_string(),
            expiry: ExpiryConfig::default(),
            cookie: CookieConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> StashResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StashError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> StashResult<Self> {
        let config: StorageConfig = toml::from_str(raw)
            .map_err(|e| StashError::config(format!("Invalid storage config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StashResult<()> {
        if !(0..=MAX_EXPIRY_MS).contains(&self.expiry.default_duration_ms) {
            return Err(StashError::config(format!(
                "expiry.defaultDurationMs must be between 0 and {}, got {}",
                MAX_EXPIRY_MS, self.expiry.default_duration_ms
            )));
        }
        if self.expiry_field.is_empty() || self.expiry_field == "value" {
            return Err(StashError::config(format!(
                "expiryField must be non-empty and differ from 'value', got '{}'",
                self.expiry_field
            )));
        }
        if self.cookie.path.is_empty() {
            return Err(StashError::config("cookie.path must not be empty"));
        }
        Ok(())
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = prefix.into();
        self
    }

    pub fn set_storage_type(&mut self, storage_type: StorageType) -> &mut Self {
        self.storage_type = storage_type;
        self
    }

    /// Default expiry duration, optionally renaming the expiry field.
    pub fn set_expiry(&mut self, duration: Duration, expiry_field: Option<&str>) -> &mut Self {
        self.expiry.default_duration_ms = duration.as_millis().min(i64::MAX as u128) as i64;
        if let Some(field) = expiry_field {
            self.expiry_field = field.to_string();
        }
        self
    }

    pub fn set_always_expire(&mut self, always_expire: bool) -> &mut Self {
        self.expiry.always_expire = always_expire;
        self
    }

    /// Cookie path, plus a cookie lifetime in days.
    ///
    /// The day count is deprecated: when non-zero it replaces the default
    /// expiry duration for every backend.
    pub fn set_storage_cookie(&mut self, days: u32, path: impl Into<String>) -> &mut Self {
        if days > 0 {
            warn!("Setting expiry through the cookie config is deprecated, use set_expiry instead");
            self.expiry.default_duration_ms = i64::from(days) * ONE_DAY_MILLISECONDS;
        }
        self.cookie.path = path.into();
        self
    }

    pub fn set_storage_cookie_domain(&mut self, domain: impl Into<String>) -> &mut Self {
        let domain = domain.into();
        self.cookie.domain = if domain.is_empty() { None } else { Some(domain) };
        self
    }

    pub fn set_notify(&mut self, set_item: bool, remove_item: bool) -> &mut Self {
        self.notify = NotifyConfig {
            set_item,
            remove_item,
        };
        self
    }
}
