//! Bulk customer import
//!
//! Reads a customer file into memory, then persists every row through a
//! [`CustomerStore`] using a fixed pool of concurrent workers. The run
//! succeeds only if every row is stored; otherwise it reports one of the
//! failures.

pub mod generator;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod types;
mod worker;

pub use generator::{sample_customer, write_sample_csv};
pub use pipeline::{ImportPipeline, DEFAULT_POOL_SIZE};
pub use source::{CsvFileSource, RecordSource, SourceError};
pub use store::{CustomerStore, MemoryCustomerStore, PgCustomerStore, StoreError};
pub use types::{
    Customer, InputRecord, Outcome, PipelineError, PipelineResult, RecordError,
    CUSTOMER_FIELD_COUNT, CUSTOMER_HEADER,
};
