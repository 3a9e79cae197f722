use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::import::{CsvFileSource, ImportPipeline};

pub const PROCESSED_MESSAGE: &str = "CSV processed successfully";

/// Import every row of `file_path`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCsvCommand {
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCsvResponse {
    pub message: String,
}

#[tracing::instrument(skip(pipeline, shutdown))]
pub async fn handle(
    pipeline: &ImportPipeline,
    shutdown: CancellationToken,
    command: ProcessCsvCommand,
) -> AppResult<ProcessCsvResponse> {
    // The whole file is read before any worker starts.
    pipeline
        .run_source_until_cancelled(CsvFileSource::new(command.file_path), shutdown)
        .await
        .into_result()?;

    Ok(ProcessCsvResponse {
        message: PROCESSED_MESSAGE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::import::PipelineError;
    use crate::import::{write_sample_csv, MemoryCustomerStore};
    use std::num::NonZeroUsize;
    use std::sync::Arc;

    fn pipeline(store: Arc<MemoryCustomerStore>) -> ImportPipeline {
        ImportPipeline::new(store, NonZeroUsize::new(4).unwrap())
    }

    #[tokio::test]
    async fn test_handle_imports_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.csv");
        write_sample_csv(&path, 40).unwrap();

        let store = Arc::new(MemoryCustomerStore::new());
        let response = handle(
            &pipeline(store.clone()),
            CancellationToken::new(),
            ProcessCsvCommand { file_path: path },
        )
        .await
        .unwrap();

        assert_eq!(response.message, PROCESSED_MESSAGE);
        assert_eq!(store.len().await, 40);
    }

    #[tokio::test]
    async fn test_handle_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryCustomerStore::new());

        let err = handle(
            &pipeline(store.clone()),
            CancellationToken::new(),
            ProcessCsvCommand {
                file_path: dir.path().join("nope.csv"),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Import(PipelineError::Acquisition(_))));
        assert!(store.is_empty().await);
    }
}
