//! Key/value document storage for the local backend

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{StoreError, StoreResult};

/// String documents addressed by key
#[async_trait]
pub trait DeviceStorage: Send + Sync {
    /// Read a document; `None` when it has never been written
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace a document
    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Process-local storage, isolated per instance
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Io { message: "memory storage lock poisoned".to_string() }
    }
}

#[async_trait]
impl DeviceStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let items = self.items.lock().map_err(|_| Self::poisoned())?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut items = self.items.lock().map_err(|_| Self::poisoned())?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per document inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl DeviceStorage for FileStorage {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write then rename so a failed write never truncates the document
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &target).await?;

        log::debug!(target: "khata::store", "Wrote {} ({} bytes)", target.display(), value.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("persons").await.unwrap(), None);

        storage.set_item("persons", "[]").await.unwrap();
        assert_eq!(storage.get_item("persons").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_memory_storage_instances_are_isolated() {
        let a = MemoryStorage::new();
        let b = MemoryStorage::new();
        a.set_item("persons", "[1]").await.unwrap();
        assert_eq!(b.get_item("persons").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get_item("expenseEntries").await.unwrap(), None);
        storage.set_item("expenseEntries", r#"[{"id":1}]"#).await.unwrap();

        let reopened = FileStorage::new(dir.path().join("nested"));
        assert_eq!(
            reopened.get_item("expenseEntries").await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
        assert!(dir.path().join("nested").join("expenseEntries.json").exists());
        assert!(!dir.path().join("nested").join(".expenseEntries.json.tmp").exists());
    }
}
