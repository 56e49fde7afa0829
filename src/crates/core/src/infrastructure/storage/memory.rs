use super::StorageArea;
use crate::util::errors::{StashError, StashResult};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory storage area preserving insertion order.
///
/// Supports an optional byte quota (key + value lengths) and can be switched
/// into a disabled state where every call fails, which is how private
/// browsing modes behave.
#[derive(Debug, Default)]
pub struct MemoryStorageArea {
    items: Mutex<IndexMap<String, String>>,
    quota_bytes: Option<usize>,
    disabled: AtomicBool,
}

impl MemoryStorageArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// An area that exists but rejects every call.
    pub fn disabled() -> Self {
        let area = Self::default();
        area.set_disabled(true);
        area
    }

    pub fn from_items(items: IndexMap<String, String>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    /// Bytes in use, counted as key plus value lengths.
    pub fn used_bytes(&self) -> usize {
        self.items
            .lock()
            .map(|items| items.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }

    fn ensure_enabled(&self) -> StashResult<()> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(StashError::unavailable("storage area is disabled"));
        }
        Ok(())
    }

    fn lock(&self) -> StashResult<std::sync::MutexGuard<'_, IndexMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| StashError::backend("storage area lock poisoned"))
    }
}

impl StorageArea for MemoryStorageArea {
    fn get_item(&self, key: &str) -> StashResult<Option<String>> {
        self.ensure_enabled()?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StashResult<()> {
        self.ensure_enabled()?;
        let mut items = self.lock()?;

        if let Some(quota) = self.quota_bytes {
            let current: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = current + key.len() + value.len();
            if needed > quota {
                return Err(StashError::quota(format!(
                    "setting '{}' needs {} bytes, quota is {}",
                    key, needed, quota
                )));
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StashResult<()> {
        self.ensure_enabled()?;
        self.lock()?.shift_remove(key);
        Ok(())
    }

    fn length(&self) -> StashResult<usize> {
        self.ensure_enabled()?;
        Ok(self.lock()?.len())
    }

    fn key(&self, index: usize) -> StashResult<Option<String>> {
        self.ensure_enabled()?;
        Ok(self.lock()?.get_index(index).map(|(k, _)| k.clone()))
    }

    fn keys(&self) -> StashResult<Vec<String>> {
        self.ensure_enabled()?;
        Ok(self.lock()?.keys().cloned().collect())
    }
}
