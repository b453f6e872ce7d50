//! Route modules for the API server
//!
//! - persons: person list, creation, per-person entries and summary
//! - expenses: entry list, creation, organization summary
//! - settings: effective configuration
//! - range: date-range query parsing

pub mod expenses;
pub mod persons;
pub mod range;
pub mod settings;
