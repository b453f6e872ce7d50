//! Record storage
//!
//! `RecordStore` is implemented by:
//! - `LocalStore`: whole-collection JSON documents in a `DeviceStorage`
//! - `RemoteStore`: rows in a remote table API reached through a `TableClient`
//! - `FallbackStore`: tries the remote store, then repeats on the local one

pub mod device;
pub mod fallback;
pub mod local;
pub mod remote;
pub mod rest;

use async_trait::async_trait;
use khata_config::StorageConfig;
use std::sync::Arc;
use thiserror::Error;

use crate::error::{CoreError, CoreResult};
use crate::models::{ExpenseEntry, NewExpenseEntry, Person};

pub use device::{DeviceStorage, FileStorage, MemoryStorage};
pub use fallback::FallbackStore;
pub use local::LocalStore;
pub use remote::{MigrationReport, RemoteStore, TableClient};
pub use rest::RestTableClient;

/// Shared store reference
pub type StoreRef = Arc<dyn RecordStore>;

/// Backend-level storage failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Remote store unreachable: {message}")]
    Transport { message: String },

    #[error("No id left after {max}")]
    IdExhausted { max: i64 },
}

/// Result type with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError::Io { message: error.to_string() }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Serialization { message: error.to_string() }
    }
}

/// The two record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Persons,
    ExpenseEntries,
}

impl Collection {
    /// Key of the local document
    pub fn storage_key(&self) -> &'static str {
        match self {
            Collection::Persons => "persons",
            Collection::ExpenseEntries => "expenseEntries",
        }
    }

    /// Name of the remote table
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Persons => "persons",
            Collection::ExpenseEntries => "expense_entries",
        }
    }
}

/// Storage operations shared by every backend
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend label used in logs
    fn backend(&self) -> &'static str;

    /// Create missing collections, seeding them when configured to
    async fn initialize(&self) -> StoreResult<()>;

    async fn list_persons(&self) -> StoreResult<Vec<Person>>;

    /// Append a person under a freshly allocated id. The name is not validated here.
    async fn add_person(&self, name: &str) -> StoreResult<Person>;

    async fn list_expenses(&self) -> StoreResult<Vec<ExpenseEntry>>;

    /// Entries whose `personId` equals `person_id`
    async fn list_expenses_by_person(&self, person_id: i64) -> StoreResult<Vec<ExpenseEntry>>;

    /// Append an entry under a freshly allocated id
    async fn add_expense_entry(&self, entry: NewExpenseEntry) -> StoreResult<ExpenseEntry>;
}

/// Open the on-disk local store described by `config`
pub fn open_local(config: &StorageConfig) -> LocalStore<FileStorage> {
    LocalStore::new(FileStorage::new(&config.local_path)).with_seed(config.seed_on_empty)
}

/// Open the remote store, if one is configured
pub fn open_remote(config: &StorageConfig) -> CoreResult<Option<RemoteStore<RestTableClient>>> {
    match config.active_remote() {
        Some(remote) => {
            let client = RestTableClient::new(remote)
                .map_err(|e| CoreError::ConfigError { message: e.to_string() })?;
            Ok(Some(RemoteStore::new(client).with_seed(config.seed_on_empty)))
        }
        None => Ok(None),
    }
}

/// Build the store used by the service: remote first when configured, local otherwise
pub fn build_store(config: &StorageConfig) -> CoreResult<StoreRef> {
    let local: StoreRef = Arc::new(open_local(config));
    let remote = open_remote(config)?.map(|r| Arc::new(r) as StoreRef);

    match &remote {
        Some(_) => log::info!(target: "khata::store", "Using remote store with local fallback"),
        None => log::info!(
            target: "khata::store",
            "No remote store configured, using local store at {}",
            config.local_path.display()
        ),
    }

    Ok(Arc::new(FallbackStore::new(remote, local)))
}

/// Test doubles for the storage traits
#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory table API with primary keys on `id` and a failure switch
    #[derive(Default)]
    pub struct MemoryTableClient {
        tables: Mutex<HashMap<String, Vec<Value>>>,
        failing: AtomicBool,
        pub calls: AtomicUsize,
    }

    impl MemoryTableClient {
        pub fn failing() -> Self {
            let client = Self::default();
            client.set_failing(true);
            client
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn rows(&self, table: &str) -> Vec<Value> {
            self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
        }

        fn check(&self) -> StoreResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Transport { message: "connection refused".to_string() });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TableClient for MemoryTableClient {
        async fn select_all(&self, table: &str) -> StoreResult<Vec<Value>> {
            self.check()?;
            Ok(self.rows(table))
        }

        async fn select_eq(&self, table: &str, field: &str, value: &Value) -> StoreResult<Vec<Value>> {
            self.check()?;
            Ok(self.rows(table).into_iter().filter(|r| r.get(field) == Some(value)).collect())
        }

        async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
            self.check()?;
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(table.to_string()).or_default();
            if rows.iter().any(|r| r.get("id") == row.get("id")) {
                return Err(StoreError::Remote {
                    status: 409,
                    message: "duplicate key value violates unique constraint".to_string(),
                });
            }
            rows.push(row.clone());
            Ok(row)
        }

        async fn upsert(&self, table: &str, new_rows: Vec<Value>) -> StoreResult<()> {
            self.check()?;
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(table.to_string()).or_default();
            for row in new_rows {
                match rows.iter_mut().find(|r| r.get("id") == row.get("id")) {
                    Some(existing) => *existing = row,
                    None => rows.push(row),
                }
            }
            Ok(())
        }
    }

    /// Device storage that reads from memory but refuses every write
    #[derive(Default)]
    pub struct ReadOnlyStorage {
        pub inner: MemoryStorage,
    }

    #[async_trait]
    impl DeviceStorage for ReadOnlyStorage {
        async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Io { message: "read-only file system".to_string() })
        }
    }
}
