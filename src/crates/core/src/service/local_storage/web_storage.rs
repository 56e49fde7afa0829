use super::namespace::KeyNamespace;
use crate::infrastructure::storage::StorageArea;
use crate::util::errors::StashResult;
use log::debug;
use rand::Rng;
use stashkit_core_types::StorageType;
use std::sync::Arc;

/// A Web Storage area seen through the service's namespace.
///
/// Methods take application keys and return the area's errors unchanged;
/// the caller decides how to fall back.
pub struct WebStorage {
    area: Arc<dyn StorageArea>,
    storage_type: StorageType,
    namespace: KeyNamespace,
}

impl WebStorage {
    /// Check that the area accepts writes by setting and removing a
    /// throwaway key. Areas that exist but throw (private browsing quota
    /// traps) fail here.
    pub fn probe(
        area: Arc<dyn StorageArea>,
        storage_type: StorageType,
        namespace: KeyNamespace,
    ) -> StashResult<Self> {
        let probe_key = namespace.qualify(&format!(
            "__{}",
            rand::thread_rng().gen_range(0..10_000_000)
        ));
        area.set_item(&probe_key, "")?;
        area.remove_item(&probe_key)?;
        debug!("Storage area probe succeeded: storage_type={}", storage_type);

        Ok(Self {
            area,
            storage_type,
            namespace,
        })
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn get_item(&self, key: &str) -> StashResult<Option<String>> {
        self.area.get_item(&self.namespace.qualify(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> StashResult<()> {
        self.area.set_item(&self.namespace.qualify(key), value)
    }

    pub fn remove_item(&self, key: &str) -> StashResult<()> {
        self.area.remove_item(&self.namespace.qualify(key))
    }

    /// Application keys of every entry in this namespace, in storage order.
    pub fn keys(&self) -> StashResult<Vec<String>> {
        Ok(self
            .area
            .keys()?
            .iter()
            .filter_map(|qualified| self.namespace.strip(qualified))
            .map(str::to_string)
            .collect())
    }

    /// `(application key, raw stored text)` pairs in this namespace.
    pub fn entries(&self) -> StashResult<Vec<(String, String)>> {
        let mut entries = Vec::new();
        for qualified in self.area.keys()? {
            let Some(key) = self.namespace.strip(&qualified) else {
                continue;
            };
            if let Some(raw) = self.area.get_item(&qualified)? {
                entries.push((key.to_string(), raw));
            }
        }
        Ok(entries)
    }

    /// Number of entries in this namespace.
    pub fn length(&self) -> StashResult<usize> {
        let total = self.area.length()?;
        let mut count = 0;
        for i in 0..total {
            if let Some(qualified) = self.area.key(i)? {
                if self.namespace.owns(&qualified) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}
