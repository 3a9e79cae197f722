//! Import record sources
//!
//! A source turns raw input into a fully materialized, ordered list of
//! records before the pipeline starts.

use std::path::PathBuf;
use thiserror::Error;

use super::types::InputRecord;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Supplies the records for one import run
pub trait RecordSource: Send + Sync {
    fn read_records(&self) -> Result<Vec<InputRecord>, SourceError>;
}

impl RecordSource for Vec<InputRecord> {
    fn read_records(&self) -> Result<Vec<InputRecord>, SourceError> {
        Ok(self.clone())
    }
}

/// Reads a comma-separated customer file with a header row
///
/// Rows may have any number of fields; a wrong field count is reported per
/// record by the workers, not here.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse records from any reader; the first row is treated as the header
    ///
    /// Fields are decoded as lossy UTF-8, so a badly encoded row is still
    /// returned (with U+FFFD in place of invalid bytes).
    pub fn parse<R: std::io::Read>(reader: R) -> Result<Vec<InputRecord>, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for (index, row) in reader.byte_records().enumerate() {
            let row = row?;
            let fields = row
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect();
            records.push(InputRecord::new(index + 1, fields));
        }

        Ok(records)
    }
}

impl RecordSource for CsvFileSource {
    fn read_records(&self) -> Result<Vec<InputRecord>, SourceError> {
        let file = std::fs::File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let records = Self::parse(std::io::BufReader::new(file))?;
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "Read import file"
        );

        Ok(records)
    }
}
