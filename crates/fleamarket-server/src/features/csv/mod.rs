//! CSV import feature
//!
//! Triggers a bulk import of the configured customer file.

pub mod commands;
pub mod routes;

pub use routes::csv_routes;
