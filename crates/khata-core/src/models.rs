//! Core data models for the ledger
//!
//! Field names serialize in camelCase (`personId`, `type`), the layout of
//! both the local documents and the remote table rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::EntryType;

/// Anything carrying an integer record id
pub trait HasId {
    fn id(&self) -> i64;
}

/// A named party transactions are recorded against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
}

impl HasId for Person {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A single credit or debit transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseEntry {
    pub id: i64,
    pub person_id: i64,
    /// Calendar date (YYYY-MM-DD)
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HasId for ExpenseEntry {
    fn id(&self) -> i64 {
        self.id
    }
}

impl ExpenseEntry {
    /// Attach an id to a new entry
    pub fn from_new(id: i64, entry: NewExpenseEntry) -> Self {
        Self {
            id,
            person_id: entry.person_id,
            date: entry.date,
            amount: entry.amount,
            entry_type: entry.entry_type,
            description: entry.description,
        }
    }
}

/// An expense entry before an id has been allocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpenseEntry {
    pub person_id: i64,
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Credit/debit totals over a set of entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_credit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_debit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// Organization-wide summary over every entry
pub type FactorySummary = Summary;

/// Summary for one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub summary: Summary,
}
