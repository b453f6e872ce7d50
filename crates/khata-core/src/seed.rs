//! Default records used to populate an empty store

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{ExpenseEntry, Person};
use crate::types::EntryType;

/// The four default persons, ids 1-4
pub fn persons() -> Vec<Person> {
    [
        (1, "John Smith (Worker)"),
        (2, "Jane Doe (Shareholder)"),
        (3, "Bob Johnson (Supplier)"),
        (4, "Alice Williams (Manager)"),
    ]
    .into_iter()
    .map(|(id, name)| Person { id, name: name.to_string() })
    .collect()
}

/// The five default entries, ids 1-5
pub fn expense_entries() -> Vec<ExpenseEntry> {
    [
        (1, 1, (2023, 5, 10), 1500, EntryType::Credit, "Monthly salary"),
        (2, 2, (2023, 5, 15), 3000, EntryType::Credit, "Dividend payment"),
        (3, 3, (2023, 5, 20), 2500, EntryType::Debit, "Raw materials purchase"),
        (4, 4, (2023, 5, 25), 2000, EntryType::Credit, "Monthly salary"),
        (5, 1, (2023, 6, 1), 500, EntryType::Debit, "Advance payment"),
    ]
    .into_iter()
    .filter_map(|(id, person_id, (y, m, d), amount, entry_type, description)| {
        Some(ExpenseEntry {
            id,
            person_id,
            date: NaiveDate::from_ymd_opt(y, m, d)?,
            amount: Decimal::from(amount),
            entry_type,
            description: Some(description.to_string()),
        })
    })
    .collect()
}
