//! Storage system
//!
//! Web Storage areas (`localStorage` / `sessionStorage` equivalents) and the
//! bundle of media a storage service is built on.

pub mod file;
pub mod memory;

pub use file::FileStorageArea;
pub use memory::MemoryStorageArea;

use crate::infrastructure::cookies::{CookieDocument, CookieJar};
use crate::util::errors::StashResult;
use stashkit_core_types::StorageType;
use std::sync::Arc;

/// A flat string-to-string storage area with Web Storage semantics.
///
/// Every call may fail (quota exceeded, storage disabled). Callers treat an
/// `Err` the way a browser caller treats a thrown exception.
pub trait StorageArea: Send + Sync {
    fn get_item(&self, key: &str) -> StashResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> StashResult<()>;

    fn remove_item(&self, key: &str) -> StashResult<()>;

    fn length(&self) -> StashResult<usize>;

    /// Name of the key at `index`, in storage order.
    fn key(&self, index: usize) -> StashResult<Option<String>>;

    /// All key names, in storage order.
    fn keys(&self) -> StashResult<Vec<String>> {
        let len = self.length()?;
        let mut keys = Vec::with_capacity(len);
        for i in 0..len {
            if let Some(key) = self.key(i)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// The storage media available to a storage service.
///
/// A missing area means the platform does not offer that storage type at all.
#[derive(Clone)]
pub struct Backends {
    pub local: Option<Arc<dyn StorageArea>>,
    pub session: Option<Arc<dyn StorageArea>>,
    pub cookies: Arc<dyn CookieDocument>,
}

impl Backends {
    pub fn new(cookies: Arc<dyn CookieDocument>) -> Self {
        Self {
            local: None,
            session: None,
            cookies,
        }
    }

    /// Fresh in-memory local and session areas plus an empty cookie jar.
    pub fn in_memory() -> Self {
        Self {
            local: Some(Arc::new(MemoryStorageArea::new())),
            session: Some(Arc::new(MemoryStorageArea::new())),
            cookies: Arc::new(CookieJar::new()),
        }
    }

    pub fn with_local(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.local = Some(area);
        self
    }

    pub fn with_session(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.session = Some(area);
        self
    }

    pub fn area(&self, storage_type: StorageType) -> Option<Arc<dyn StorageArea>> {
        match storage_type {
            StorageType::LocalStorage => self.local.clone(),
            StorageType::SessionStorage => self.session.clone(),
            StorageType::Cookie => None,
        }
    }
}
