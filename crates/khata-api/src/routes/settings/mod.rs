//! Settings routes

pub mod api;

pub use api::api_settings;
