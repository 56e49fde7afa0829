//! Notification signals emitted by the storage façade.
//!
//! Signals are fire-and-forget. They are the only channel through which
//! degraded backends and failed writes are reported to the host.

use crate::StorageType;
use serde::{Deserialize, Serialize};

/// Warning message used when Web Storage cannot be used.
pub const LOCAL_STORAGE_NOT_SUPPORTED: &str = "LOCAL_STORAGE_NOT_SUPPORTED";
/// Error message used when the cookie backend is needed but disabled.
pub const COOKIES_NOT_SUPPORTED: &str = "COOKIES_NOT_SUPPORTED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StorageSignal {
    Warning {
        message: String,
    },
    Error {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    SetItem {
        key: String,
        /// Encoded value as written (`None` when an unset value was normalized).
        new_value: Option<String>,
        storage_type: StorageType,
    },
    #[serde(rename_all = "camelCase")]
    RemoveItem {
        key: String,
        storage_type: StorageType,
    },
}

impl StorageSignal {
    pub fn warning(message: impl Into<String>) -> Self {
        StorageSignal::Warning {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StorageSignal::Error {
            message: message.into(),
        }
    }

    /// Event name as seen by subscribers.
    pub fn name(&self) -> &'static str {
        match self {
            StorageSignal::Warning { .. } => "storage.warning",
            StorageSignal::Error { .. } => "storage.error",
            StorageSignal::SetItem { .. } => "storage.setItem",
            StorageSignal::RemoveItem { .. } => "storage.removeItem",
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, StorageSignal::Warning { .. } | StorageSignal::Error { .. })
    }
}
