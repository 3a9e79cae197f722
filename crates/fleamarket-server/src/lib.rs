//! Fleamarket Server Library
//!
//! HTTP backend for the Fleamarket marketplace.
//!
//! # Overview
//!
//! - **Bulk import**: a worker-pool pipeline that persists every row of a
//!   customer CSV file through a pluggable [`import::CustomerStore`]
//! - **API Endpoints**: feature slices mounted under `/api/v1`
//! - **Configuration**: environment-based configuration management
//! - **Middleware**: CORS and request logging
//!
//! # Example
//!
//! ```no_run
//! use fleamarket_server::import::{CsvFileSource, ImportPipeline, MemoryCustomerStore, DEFAULT_POOL_SIZE};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = ImportPipeline::new(Arc::new(MemoryCustomerStore::new()), DEFAULT_POOL_SIZE);
//!     pipeline
//!         .run_source(CsvFileSource::new("./data/sample_data_100000.csv"))
//!         .await
//!         .into_result()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod import;
pub mod middleware;
pub mod server;

// Re-export commonly used types
pub use error::{AppError, AppResult};
