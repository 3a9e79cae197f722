//! Core types for the bulk customer import
//!
//! Record-level and run-level failures are kept in separate types so a
//! single bad row can never be mistaken for a failed run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::source::SourceError;
use super::store::StoreError;

/// Number of positional fields in one customer row
pub const CUSTOMER_FIELD_COUNT: usize = 10;

/// Column names of the customer file, in positional order
pub const CUSTOMER_HEADER: [&str; CUSTOMER_FIELD_COUNT] = [
    "ID",
    "First Name",
    "Last Name",
    "Email",
    "Phone Number",
    "Address",
    "City",
    "State",
    "Zip Code",
    "Country",
];

/// One parsed row of the import file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    /// 1-based data row number (the header row is not counted)
    pub position: usize,
    pub fields: Vec<String>,
}

impl InputRecord {
    pub fn new(position: usize, fields: Vec<String>) -> Self {
        Self { position, fields }
    }
}

/// Customer row ready to be persisted
///
/// Field 0 of the input (the external identifier) is not carried; the store
/// assigns its own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl TryFrom<&InputRecord> for Customer {
    type Error = RecordError;

    fn try_from(record: &InputRecord) -> Result<Self, Self::Error> {
        let fields = record.fields.as_slice();
        if fields.len() != CUSTOMER_FIELD_COUNT {
            return Err(RecordError::Malformed {
                position: record.position,
                expected: CUSTOMER_FIELD_COUNT,
                found: fields.len(),
            });
        }

        Ok(Customer {
            first_name: fields[1].clone(),
            last_name: fields[2].clone(),
            email: fields[3].clone(),
            phone_number: fields[4].clone(),
            address: fields[5].clone(),
            city: fields[6].clone(),
            state: fields[7].clone(),
            zip_code: fields[8].clone(),
            country: fields[9].clone(),
        })
    }
}

/// Why a single record could not be persisted
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record {position}: expected {expected} fields, found {found}")]
    Malformed {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("record {position}: {source}")]
    Store {
        position: usize,
        #[source]
        source: StoreError,
    },
}

impl RecordError {
    pub fn position(&self) -> usize {
        match self {
            RecordError::Malformed { position, .. } | RecordError::Store { position, .. } => {
                *position
            }
        }
    }
}

/// Result of persisting one record
#[derive(Debug)]
pub enum Outcome {
    Success,
    Failure(RecordError),
}

/// Why an import run did not succeed
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The record source could not be read; no records were attempted
    #[error("failed to read import source: {0}")]
    Acquisition(#[from] SourceError),

    /// At least one record failed; this is one of them
    #[error("import failed: {0}")]
    Record(#[from] RecordError),

    /// A worker task ended abnormally
    #[error("import worker terminated abnormally: {0}")]
    Worker(String),

    #[error("import cancelled after attempting {attempted} of {total} records")]
    Cancelled { attempted: usize, total: usize },
}

/// Aggregate verdict of one import run
#[derive(Debug)]
pub enum PipelineResult {
    Success,
    Failure(PipelineError),
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success)
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            PipelineResult::Success => None,
            PipelineResult::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<(), PipelineError> {
        match self {
            PipelineResult::Success => Ok(()),
            PipelineResult::Failure(err) => Err(err),
        }
    }
}

impl From<PipelineError> for PipelineResult {
    fn from(err: PipelineError) -> Self {
        PipelineResult::Failure(err)
    }
}

impl From<RecordError> for PipelineResult {
    fn from(err: RecordError) -> Self {
        PipelineResult::Failure(err.into())
    }
}

impl From<SourceError> for PipelineResult {
    fn from(err: SourceError) -> Self {
        PipelineResult::Failure(err.into())
    }
}
