//! Local backend: each collection is one JSON array document

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use super::{Collection, DeviceStorage, RecordStore, StoreResult};
use crate::ids::next_id;
use crate::models::{ExpenseEntry, NewExpenseEntry, Person};
use crate::seed;

/// Record store over a `DeviceStorage`
///
/// Every add is a read-modify-write of the whole collection. The write lock
/// is held from the read through the write, so concurrent adds within one
/// process never reuse an id or drop each other's records.
pub struct LocalStore<S: DeviceStorage> {
    storage: S,
    seed_on_empty: bool,
    write_lock: Mutex<()>,
}

impl<S: DeviceStorage> LocalStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            seed_on_empty: true,
            write_lock: Mutex::new(()),
        }
    }

    /// Whether `initialize` fills missing or empty collections with default records
    pub fn with_seed(mut self, seed_on_empty: bool) -> Self {
        self.seed_on_empty = seed_on_empty;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn read<T: DeserializeOwned>(&self, collection: Collection) -> StoreResult<Vec<T>> {
        match self.storage.get_item(collection.storage_key()).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write<T: Serialize + Sync>(&self, collection: Collection, records: &[T]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)?;
        self.storage.set_item(collection.storage_key(), &raw).await
    }

    /// Seed `collection` when it is absent or empty
    async fn ensure<T>(&self, collection: Collection, defaults: Vec<T>) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let existing = self.storage.get_item(collection.storage_key()).await?;
        let empty = match &existing {
            Some(raw) => serde_json::from_str::<Vec<T>>(raw)?.is_empty(),
            None => true,
        };
        if !empty {
            return Ok(());
        }

        if self.seed_on_empty {
            log::info!(
                target: "khata::store",
                "Seeding {} with {} default records",
                collection.storage_key(),
                defaults.len()
            );
            self.write(collection, &defaults).await
        } else if existing.is_none() {
            self.write::<T>(collection, &[]).await
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<S: DeviceStorage> RecordStore for LocalStore<S> {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn initialize(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.ensure(Collection::Persons, seed::persons()).await?;
        self.ensure(Collection::ExpenseEntries, seed::expense_entries()).await
    }

    async fn list_persons(&self) -> StoreResult<Vec<Person>> {
        self.read(Collection::Persons).await
    }

    async fn add_person(&self, name: &str) -> StoreResult<Person> {
        let _guard = self.write_lock.lock().await;
        let mut persons: Vec<Person> = self.read(Collection::Persons).await?;
        let person = Person {
            id: next_id(&persons)?,
            name: name.to_string(),
        };
        persons.push(person.clone());
        self.write(Collection::Persons, &persons).await?;
        Ok(person)
    }

    async fn list_expenses(&self) -> StoreResult<Vec<ExpenseEntry>> {
        self.read(Collection::ExpenseEntries).await
    }

    async fn list_expenses_by_person(&self, person_id: i64) -> StoreResult<Vec<ExpenseEntry>> {
        let entries: Vec<ExpenseEntry> = self.read(Collection::ExpenseEntries).await?;
        Ok(entries.into_iter().filter(|e| e.person_id == person_id).collect())
    }

    async fn add_expense_entry(&self, entry: NewExpenseEntry) -> StoreResult<ExpenseEntry> {
        let _guard = self.write_lock.lock().await;
        let mut entries: Vec<ExpenseEntry> = self.read(Collection::ExpenseEntries).await?;
        let entry = ExpenseEntry::from_new(next_id(&entries)?, entry);
        entries.push(entry.clone());
        self.write(Collection::ExpenseEntries, &entries).await?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_utils::ReadOnlyStorage;
    use crate::store::{FileStorage, MemoryStorage, StoreError};
    use crate::types::EntryType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn new_entry(person_id: i64, amount: i64) -> NewExpenseEntry {
        NewExpenseEntry {
            person_id,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            amount: Decimal::from(amount),
            entry_type: EntryType::Debit,
            description: None,
        }
    }

    async fn seeded() -> LocalStore<MemoryStorage> {
        let store = LocalStore::new(MemoryStorage::new());
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_first_run_seeds_defaults() {
        let store = seeded().await;
        assert_eq!(store.list_persons().await.unwrap(), seed::persons());
        assert_eq!(store.list_expenses().await.unwrap(), seed::expense_entries());
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_records() {
        let store = seeded().await;
        store.add_person("Extra").await.unwrap();
        store.initialize().await.unwrap();
        assert_eq!(store.list_persons().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_empty_collection_is_reseeded() {
        let storage = MemoryStorage::new();
        storage.set_item("persons", "[]").await.unwrap();
        let store = LocalStore::new(storage);
        store.initialize().await.unwrap();
        assert_eq!(store.list_persons().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_without_seed_collections_start_empty() {
        let store = LocalStore::new(MemoryStorage::new()).with_seed(false);
        store.initialize().await.unwrap();
        assert!(store.list_persons().await.unwrap().is_empty());
        assert_eq!(store.storage().get_item("expenseEntries").await.unwrap().as_deref(), Some("[]"));

        let first = store.add_person("First").await.unwrap();
        assert_eq!(first.id, 1);
    }

    #[tokio::test]
    async fn test_ids_follow_the_maximum() {
        let store = seeded().await;
        let a = store.add_person("Ravi").await.unwrap();
        let b = store.add_person("Meena").await.unwrap();
        assert_eq!((a.id, b.id), (5, 6));

        let entry = store.add_expense_entry(new_entry(a.id, 250)).await.unwrap();
        assert_eq!(entry.id, 6);
        assert_eq!(entry.person_id, 5);
    }

    #[tokio::test]
    async fn test_list_by_person() {
        let store = seeded().await;
        let ids: Vec<i64> = store
            .list_expenses_by_person(1)
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![1, 5]);
        assert!(store.list_expenses_by_person(42).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_keep_every_record() {
        let store = Arc::new(seeded().await);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add_expense_entry(new_entry(2, 100 + i)).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap().id);
        }
        assert_eq!(ids, (6..=25).collect::<HashSet<i64>>());

        let stored = store.list_expenses().await.unwrap();
        assert_eq!(stored.len(), 25);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_data_unchanged() {
        let storage = ReadOnlyStorage::default();
        let persons = serde_json::to_string(&seed::persons()).unwrap();
        storage.inner.set_item("persons", &persons).await.unwrap();

        let store = LocalStore::new(storage);
        let err = store.add_person("Lost").await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.list_persons().await.unwrap(), seed::persons());
    }

    #[tokio::test]
    async fn test_exhausted_ids_leave_collection_unchanged() {
        let storage = MemoryStorage::new();
        let full = vec![Person { id: i64::MAX, name: "Last".to_string() }];
        storage.set_item("persons", &serde_json::to_string(&full).unwrap()).await.unwrap();

        let store = LocalStore::new(storage);
        assert_eq!(
            store.add_person("Overflow").await.unwrap_err(),
            StoreError::IdExhausted { max: i64::MAX }
        );
        assert_eq!(store.list_persons().await.unwrap(), full);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_serialization_error() {
        let storage = MemoryStorage::new();
        storage.set_item("persons", "{not json").await.unwrap();
        let store = LocalStore::new(storage);
        assert!(matches!(
            store.list_persons().await.unwrap_err(),
            StoreError::Serialization { .. }
        ));
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(FileStorage::new(dir.path()));
        store.initialize().await.unwrap();
        store.add_person("Durable").await.unwrap();

        let reopened = LocalStore::new(FileStorage::new(dir.path()));
        reopened.initialize().await.unwrap();
        let names: Vec<String> = reopened.list_persons().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names.last().map(String::as_str), Some("Durable"));
        assert_eq!(names.len(), 5);
    }
}
