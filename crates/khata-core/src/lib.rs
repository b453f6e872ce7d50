//! Core ledger storage, aggregation and filtering

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod ids;
pub mod models;
pub mod seed;
pub mod store;
pub mod types;

use std::sync::Arc;

use rust_decimal::Decimal;

pub use error::{CoreError, CoreResult, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity, DefaultErrorLogger};
pub use filter::{DateRange, LedgerView};
pub use models::{ExpenseEntry, FactorySummary, NewExpenseEntry, Person, PersonSummary, Summary};
pub use store::{build_store, RecordStore, StoreRef};
pub use types::EntryType;

// ==================== Ledger Service ====================

/// Ledger operations on top of a record store
///
/// Input validation happens here; the stores accept whatever they are given.
pub struct Khata {
    store: StoreRef,
}

/// Shared service reference
pub type KhataRef = Arc<Khata>;

/// Largest amount a single entry may carry
///
/// Keeps every total well inside the `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

impl Khata {
    pub fn new(store: StoreRef) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    /// Prepare the backing collections, seeding them on first run
    pub async fn initialize(&self) -> CoreResult<()> {
        self.store.initialize().await?;
        log::info!(target: "khata::core", "Ledger initialized ({} store)", self.store.backend());
        Ok(())
    }

    pub async fn list_persons(&self) -> CoreResult<Vec<Person>> {
        Ok(self.store.list_persons().await?)
    }

    pub async fn list_expenses(&self) -> CoreResult<Vec<ExpenseEntry>> {
        Ok(self.store.list_expenses().await?)
    }

    pub async fn list_expenses_by_person(&self, person_id: i64) -> CoreResult<Vec<ExpenseEntry>> {
        Ok(self.store.list_expenses_by_person(person_id).await?)
    }

    pub async fn find_person(&self, id: i64) -> CoreResult<Person> {
        self.list_persons()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(CoreError::PersonNotFound { id })
    }

    /// Add a person; the name is trimmed and must not be empty
    pub async fn add_person(&self, name: &str) -> CoreResult<Person> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Person name must not be empty"));
        }

        let person = self.store.add_person(name).await?;
        log::info!(target: "khata::core", "Added person {} ({})", person.id, person.name);
        Ok(person)
    }

    /// Record a transaction against an existing person
    pub async fn add_expense_entry(&self, mut entry: NewExpenseEntry) -> CoreResult<ExpenseEntry> {
        if entry.amount <= Decimal::ZERO {
            return Err(CoreError::validation("Amount must be a positive number"));
        }
        if entry.amount > MAX_AMOUNT {
            return Err(CoreError::validation(format!("Amount must not exceed {}", MAX_AMOUNT)));
        }
        match self.find_person(entry.person_id).await {
            Ok(_) => {}
            Err(CoreError::PersonNotFound { id }) => {
                return Err(CoreError::validation(format!("Unknown person id {}", id)));
            }
            Err(e) => return Err(e),
        }

        entry.description = entry
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let entry = self.store.add_expense_entry(entry).await?;
        log::info!(
            target: "khata::core",
            "Recorded {} of {} for person {} (entry {})",
            entry.entry_type,
            entry.amount,
            entry.person_id,
            entry.id
        );
        Ok(entry)
    }

    /// Totals for one person over `range`
    pub async fn person_summary(&self, id: i64, range: DateRange) -> CoreResult<PersonSummary> {
        let person = self.find_person(id).await?;
        let entries = range.apply(&self.list_expenses_by_person(id).await?);
        Ok(aggregate::person_summary(&person, &entries))
    }

    /// Totals over every entry in `range`
    pub async fn factory_summary(&self, range: DateRange) -> CoreResult<FactorySummary> {
        let entries = self.list_expenses().await?;
        Ok(aggregate::summarize(entries.iter().filter(|e| range.contains(&e.date))))
    }

    /// Person with their entries loaded for interactive filtering
    pub async fn person_ledger(&self, id: i64) -> CoreResult<(Person, LedgerView)> {
        let person = self.find_person(id).await?;
        let entries = self.list_expenses_by_person(id).await?;
        Ok((person, LedgerView::new(entries)))
    }

    /// Every entry loaded for interactive filtering
    pub async fn factory_ledger(&self) -> CoreResult<LedgerView> {
        Ok(LedgerView::new(self.list_expenses().await?))
    }
}
