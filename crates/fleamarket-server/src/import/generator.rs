//! Sample customer file generator
//!
//! Produces deterministic rows in the import file layout, for load testing
//! and local development.

use std::path::Path;

use super::source::SourceError;
use super::types::{CUSTOMER_FIELD_COUNT, CUSTOMER_HEADER};

/// Build the row for customer `id`
pub fn sample_customer(id: usize) -> [String; CUSTOMER_FIELD_COUNT] {
    [
        id.to_string(),
        format!("FirstName{}", id),
        format!("LastName{}", id),
        format!("user{}@example.com", id),
        format!("555-000-{:04}", id),
        format!("{} Maple St", id),
        format!("City{}", id),
        "CA".to_string(),
        format!("900{:02}", id % 100),
        "USA".to_string(),
    ]
}

/// Write a header plus `count` sample rows (ids `1..=count`) to `writer`
pub fn write_sample_rows<W: std::io::Write>(writer: W, count: usize) -> Result<(), SourceError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CUSTOMER_HEADER)?;
    for id in 1..=count {
        writer.write_record(&sample_customer(id))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Create (or truncate) `path` and fill it with `count` sample rows
pub fn write_sample_csv(path: &Path, count: usize) -> Result<(), SourceError> {
    let io_error = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = std::fs::File::create(path).map_err(io_error)?;
    write_sample_rows(std::io::BufWriter::new(file), count)?;

    tracing::info!(path = %path.display(), records = count, "Sample CSV written");
    Ok(())
}
