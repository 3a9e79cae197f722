//! Bulk import orchestrator
//!
//! Fans records out to a fixed pool of workers and folds their outcomes into
//! one verdict:
//! 1. Size the job and outcome queues to the record count
//! 2. Spawn `pool_size` workers
//! 3. Enqueue every record in input order, then close the job queue
//! 4. Wait for every worker to stop
//! 5. Drain the outcome queue; any failure fails the run

use futures::future::join_all;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use super::source::RecordSource;
use super::store::CustomerStore;
use super::types::{InputRecord, Outcome, PipelineError, PipelineResult, RecordError};
use super::worker::ImportWorker;

/// Worker count used when none is configured
pub const DEFAULT_POOL_SIZE: NonZeroUsize = match NonZeroUsize::new(30) {
    Some(size) => size,
    None => panic!("default pool size must be non-zero"),
};

/// Imports customer records through a bounded pool of concurrent workers
pub struct ImportPipeline {
    store: Arc<dyn CustomerStore>,
    pool_size: NonZeroUsize,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn CustomerStore>, pool_size: NonZeroUsize) -> Self {
        Self { store, pool_size }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size.get()
    }

    pub fn store(&self) -> &Arc<dyn CustomerStore> {
        &self.store
    }

    /// Read all records from `source`, then import them
    ///
    /// The read runs on the blocking thread pool. If the source cannot be read
    /// no worker is started and the read error is returned as the run's
    /// failure.
    pub async fn run_source<S>(&self, source: S) -> PipelineResult
    where
        S: RecordSource + 'static,
    {
        self.run_source_until_cancelled(source, CancellationToken::new())
            .await
    }

    pub async fn run_source_until_cancelled<S>(
        &self,
        source: S,
        cancel: CancellationToken,
    ) -> PipelineResult
    where
        S: RecordSource + 'static,
    {
        let read = match tokio::task::spawn_blocking(move || source.read_records()).await {
            Ok(read) => read,
            Err(err) => {
                error!(error = %err, "Import source reader terminated abnormally");
                return PipelineError::Worker(err.to_string()).into();
            }
        };

        match read {
            Ok(records) => self.run_until_cancelled(records, cancel).await,
            Err(err) => {
                error!(error = %err, "Import source unavailable");
                err.into()
            }
        }
    }

    /// Import `records`, returning only after every worker has stopped
    pub async fn run(&self, records: Vec<InputRecord>) -> PipelineResult {
        self.run_until_cancelled(records, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but workers stop taking new records once
    /// `cancel` fires
    ///
    /// Records already being persisted finish. A run that leaves records
    /// unattempted fails with [`PipelineError::Cancelled`] unless a record
    /// failure was already observed.
    #[tracing::instrument(
        skip_all,
        fields(run_id = %Uuid::new_v4(), records = records.len(), pool_size = self.pool_size.get())
    )]
    pub async fn run_until_cancelled(
        &self,
        records: Vec<InputRecord>,
        cancel: CancellationToken,
    ) -> PipelineResult {
        let total = records.len();
        if total == 0 {
            info!("No records to import");
            return PipelineResult::Success;
        }

        let started = Instant::now();
        info!("Starting import");

        // Both queues hold every record, so neither side ever waits for space.
        let (job_tx, job_rx) = mpsc::channel::<InputRecord>(total);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<Outcome>(total);
        let jobs = Arc::new(Mutex::new(job_rx));

        let workers: Vec<_> = (0..self.pool_size.get())
            .map(|worker_id| {
                let worker = ImportWorker::new(
                    worker_id,
                    self.store.clone(),
                    jobs.clone(),
                    outcome_tx.clone(),
                    cancel.clone(),
                );
                tokio::spawn(worker.run().in_current_span())
            })
            .collect();
        drop(outcome_tx);

        for record in records {
            if job_tx.send(record).await.is_err() {
                break;
            }
        }
        drop(job_tx);

        let mut worker_failure = None;
        for joined in join_all(workers).await {
            if let Err(err) = joined {
                error!(error = %err, "Import worker terminated abnormally");
                worker_failure.get_or_insert_with(|| err.to_string());
            }
        }

        outcome_rx.close();
        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut first_failure: Option<RecordError> = None;
        while let Some(outcome) = outcome_rx.recv().await {
            match outcome {
                Outcome::Success => succeeded += 1,
                Outcome::Failure(err) => {
                    failed += 1;
                    first_failure.get_or_insert(err);
                }
            }
        }

        let attempted = succeeded + failed;
        let elapsed = started.elapsed();
        if failed > 0 || attempted < total {
            warn!(succeeded, failed, attempted, total, ?elapsed, "Import finished with failures");
        } else {
            info!(succeeded, ?elapsed, "Import finished");
        }

        if let Some(err) = first_failure {
            return PipelineError::Record(err).into();
        }
        if let Some(message) = worker_failure {
            return PipelineError::Worker(message).into();
        }
        if attempted < total {
            return PipelineError::Cancelled { attempted, total }.into();
        }

        PipelineResult::Success
    }
}
