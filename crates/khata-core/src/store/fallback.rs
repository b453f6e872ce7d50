//! Remote-first store that falls back to the local store per call

use async_trait::async_trait;

use super::{RecordStore, StoreError, StoreRef, StoreResult};
use crate::models::{ExpenseEntry, NewExpenseEntry, Person};

/// Tries the remote store first; when it fails, repeats the same call on the
/// local store and returns that result instead.
///
/// Writes that fell back are not replayed to the remote store later, so the
/// two backends can drift apart until the next migration.
pub struct FallbackStore {
    remote: Option<StoreRef>,
    local: StoreRef,
}

impl FallbackStore {
    pub fn new(remote: Option<StoreRef>, local: StoreRef) -> Self {
        Self { remote, local }
    }

    fn fall_back(&self, operation: &str, error: &StoreError) {
        log::warn!(
            target: "khata::fallback",
            "Remote {} failed, using local store: {}",
            operation,
            error
        );
    }
}

/// Run `$call` against the remote store, then against the local one on failure
macro_rules! remote_or_local {
    ($self:ident, $op:literal, |$store:ident| $call:expr) => {{
        if let Some($store) = &$self.remote {
            match $call.await {
                Ok(value) => return Ok(value),
                Err(e) => $self.fall_back($op, &e),
            }
        }
        let $store = &$self.local;
        $call.await
    }};
}

#[async_trait]
impl RecordStore for FallbackStore {
    fn backend(&self) -> &'static str {
        "fallback"
    }

    async fn initialize(&self) -> StoreResult<()> {
        // The local store is always prepared so a later fallback finds its collections
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.initialize().await {
                self.fall_back("initialize", &e);
            }
        }
        self.local.initialize().await
    }

    async fn list_persons(&self) -> StoreResult<Vec<Person>> {
        remote_or_local!(self, "list_persons", |store| store.list_persons())
    }

    async fn add_person(&self, name: &str) -> StoreResult<Person> {
        remote_or_local!(self, "add_person", |store| store.add_person(name))
    }

    async fn list_expenses(&self) -> StoreResult<Vec<ExpenseEntry>> {
        remote_or_local!(self, "list_expenses", |store| store.list_expenses())
    }

    async fn list_expenses_by_person(&self, person_id: i64) -> StoreResult<Vec<ExpenseEntry>> {
        remote_or_local!(self, "list_expenses_by_person", |store| store
            .list_expenses_by_person(person_id))
    }

    async fn add_expense_entry(&self, entry: NewExpenseEntry) -> StoreResult<ExpenseEntry> {
        remote_or_local!(self, "add_expense_entry", |store| store
            .add_expense_entry(entry.clone()))
    }
}
