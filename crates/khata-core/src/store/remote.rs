//! Remote backend: rows in hosted tables behind a `TableClient`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{Collection, RecordStore, StoreResult};
use crate::ids::next_id;
use crate::models::{ExpenseEntry, HasId, NewExpenseEntry, Person};
use crate::seed;

/// Minimal table API used by `RemoteStore`
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Every row of `table`
    async fn select_all(&self, table: &str) -> StoreResult<Vec<Value>>;

    /// Rows of `table` whose `field` equals `value`
    async fn select_eq(&self, table: &str, field: &str, value: &Value) -> StoreResult<Vec<Value>>;

    /// Insert one row and return it as stored
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value>;

    /// Insert rows, replacing any with the same `id`
    async fn upsert(&self, table: &str, rows: Vec<Value>) -> StoreResult<()>;
}

/// Counts of records copied by a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationReport {
    pub persons: usize,
    pub entries: usize,
}

/// Record store over a remote table API
///
/// Ids are allocated client-side from the rows read just before the insert.
/// Two writers racing on the same table can pick the same id; the loser gets
/// the table's primary-key error back.
pub struct RemoteStore<C: TableClient> {
    client: C,
    seed_on_empty: bool,
}

fn decode<T: DeserializeOwned + HasId>(rows: Vec<Value>) -> StoreResult<Vec<T>> {
    let mut records = rows
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;
    records.sort_by_key(|r| r.id());
    Ok(records)
}

fn encode<T: Serialize>(records: &[T]) -> StoreResult<Vec<Value>> {
    Ok(records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?)
}

impl<C: TableClient> RemoteStore<C> {
    pub fn new(client: C) -> Self {
        Self { client, seed_on_empty: true }
    }

    pub fn with_seed(mut self, seed_on_empty: bool) -> Self {
        self.seed_on_empty = seed_on_empty;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn select<T: DeserializeOwned + HasId>(&self, collection: Collection) -> StoreResult<Vec<T>> {
        decode(self.client.select_all(collection.table_name()).await?)
    }

    async fn insert<T>(&self, collection: Collection, record: &T) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        let row = serde_json::to_value(record)?;
        let stored = self.client.insert(collection.table_name(), row).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Insert or replace persons by id
    pub async fn upsert_persons(&self, persons: &[Person]) -> StoreResult<()> {
        if persons.is_empty() {
            return Ok(());
        }
        self.client
            .upsert(Collection::Persons.table_name(), encode(persons)?)
            .await
    }

    /// Insert or replace entries by id
    pub async fn upsert_entries(&self, entries: &[ExpenseEntry]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.client
            .upsert(Collection::ExpenseEntries.table_name(), encode(entries)?)
            .await
    }

    /// Copy every record of `source` into the remote tables, keeping ids.
    /// Safe to repeat: rows already present are overwritten, not duplicated.
    pub async fn migrate_from(&self, source: &dyn RecordStore) -> StoreResult<MigrationReport> {
        let persons = source.list_persons().await?;
        let entries = source.list_expenses().await?;

        self.upsert_persons(&persons).await?;
        self.upsert_entries(&entries).await?;

        log::info!(
            target: "khata::store",
            "Migrated {} persons and {} entries from {} store",
            persons.len(),
            entries.len(),
            source.backend()
        );
        Ok(MigrationReport {
            persons: persons.len(),
            entries: entries.len(),
        })
    }
}

#[async_trait]
impl<C: TableClient> RecordStore for RemoteStore<C> {
    fn backend(&self) -> &'static str {
        "remote"
    }

    async fn initialize(&self) -> StoreResult<()> {
        if !self.seed_on_empty {
            return Ok(());
        }
        if self.client.select_all(Collection::Persons.table_name()).await?.is_empty() {
            log::info!(target: "khata::store", "Seeding remote persons table");
            self.upsert_persons(&seed::persons()).await?;
        }
        if self.client.select_all(Collection::ExpenseEntries.table_name()).await?.is_empty() {
            log::info!(target: "khata::store", "Seeding remote expense entries table");
            self.upsert_entries(&seed::expense_entries()).await?;
        }
        Ok(())
    }

    async fn list_persons(&self) -> StoreResult<Vec<Person>> {
        self.select(Collection::Persons).await
    }

    async fn add_person(&self, name: &str) -> StoreResult<Person> {
        let persons: Vec<Person> = self.select(Collection::Persons).await?;
        let person = Person {
            id: next_id(&persons)?,
            name: name.to_string(),
        };
        self.insert(Collection::Persons, &person).await
    }

    async fn list_expenses(&self) -> StoreResult<Vec<ExpenseEntry>> {
        self.select(Collection::ExpenseEntries).await
    }

    async fn list_expenses_by_person(&self, person_id: i64) -> StoreResult<Vec<ExpenseEntry>> {
        let rows = self
            .client
            .select_eq(
                Collection::ExpenseEntries.table_name(),
                "personId",
                &Value::from(person_id),
            )
            .await?;
        decode(rows)
    }

    async fn add_expense_entry(&self, entry: NewExpenseEntry) -> StoreResult<ExpenseEntry> {
        let entries: Vec<ExpenseEntry> = self.select(Collection::ExpenseEntries).await?;
        let entry = ExpenseEntry::from_new(next_id(&entries)?, entry);
        self.insert(Collection::ExpenseEntries, &entry).await
    }
}
