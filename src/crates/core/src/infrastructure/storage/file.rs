use super::{MemoryStorageArea, StorageArea};
use crate::util::errors::StashResult;
use indexmap::IndexMap;
use log::debug;
use std::path::{Path, PathBuf};

/// Storage area persisted as a JSON object on disk.
///
/// Contents live in memory and the whole file is rewritten after every
/// mutation.
#[derive(Debug)]
pub struct FileStorageArea {
    path: PathBuf,
    inner: MemoryStorageArea,
}

impl FileStorageArea {
    /// Open the area at `path`, starting empty when the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> StashResult<Self> {
        let path = path.as_ref().to_path_buf();
        let items: IndexMap<String, String> = if path.exists() {
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
            "Opened file storage area: path={}, entries={}",
            path.display(),
            items.len()
        );

        Ok(Self {
            path,
            inner: MemoryStorageArea::from_items(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StashResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(&self.inner.snapshot())?;
        std::fs::write(&self.path, serialized.as_bytes())?;
        Ok(())
    }
}

impl StorageArea for FileStorageArea {
    fn get_item(&self, key: &str) -> StashResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StashResult<()> {
        self.inner.set_item(key, value)?;
        self.flush()
    }

    fn remove_item(&self, key: &str) -> StashResult<()> {
        self.inner.remove_item(key)?;
        self.flush()
    }

    fn length(&self) -> StashResult<usize> {
        self.inner.length()
    }

    fn key(&self, index: usize) -> StashResult<Option<String>> {
        self.inner.key(index)
    }

    fn keys(&self) -> StashResult<Vec<String>> {
        self.inner.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");

        let area = FileStorageArea::open(&path).unwrap();
        area.set_item("app.theme", "\"dark\"").unwrap();
        area.set_item("app.count", "3").unwrap();
        area.remove_item("app.count").unwrap();
        drop(area);

        let reopened = FileStorageArea::open(&path).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["app.theme"]);
        assert_eq!(
            reopened.get_item("app.theme").unwrap().as_deref(),
            Some("\"dark\"")
        );
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileStorageArea::open(&path).is_err());
    }
}
