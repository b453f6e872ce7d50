//! Expense entry routes

pub mod api;

pub use api::{api_create_expense, api_expenses, api_summary};
