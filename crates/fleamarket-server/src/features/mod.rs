//! Feature modules implementing the Fleamarket API
//!
//! Each feature is a vertical slice with its own commands and routes.
//!
//! # Features
//!
//! - **csv**: bulk customer import from the configured CSV file

pub mod csv;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::import::ImportPipeline;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Import pipeline bound to the configured customer store
    pub pipeline: Arc<ImportPipeline>,
    /// CSV file processed by the csv feature
    pub import_file: PathBuf,
    /// Cancelled when the server starts shutting down
    pub shutdown: CancellationToken,
}

/// Creates the API router with all feature routes mounted
///
/// - `/csv` - Bulk customer import
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/csv", csv::csv_routes().with_state(state))
}
