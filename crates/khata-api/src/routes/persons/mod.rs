//! Person routes

pub mod api;

pub use api::{api_create_person, api_person_expenses, api_person_summary, api_persons};
