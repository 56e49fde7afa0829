//! Error types
//!
//! Errors only travel between backends and the storage façade. The façade
//! turns every one of them into a signal plus a fallback value.

use thiserror::Error;

pub type StashResult<T> = Result<T, StashError>;

#[derive(Debug, Error)]
pub enum StashError {
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Cookies are not supported")]
    CookiesUnsupported,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StashError {
    pub fn quota(msg: impl Into<String>) -> Self {
        StashError::QuotaExceeded(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        StashError::Unavailable(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        StashError::Backend(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        StashError::Config(msg.into())
    }
}
