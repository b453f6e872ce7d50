//! Basic types for the ledger core

use serde::{Deserialize, Serialize};

/// Direction of an expense entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Money in, increases the balance
    Credit,
    /// Money out, decreases the balance
    Debit,
}

impl std::str::FromStr for EntryType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(EntryType::Credit),
            "debit" => Ok(EntryType::Debit),
            _ => Err(format!("Invalid entry type: {}", s)),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Credit => f.pad("Credit"),
            EntryType::Debit => f.pad("Debit"),
        }
    }
}
