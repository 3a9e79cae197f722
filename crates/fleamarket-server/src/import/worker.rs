//! Import worker
//!
//! Workers share one job queue and one outcome queue. Each worker takes a
//! record, persists it, and reports exactly one outcome for it until the job
//! queue is closed and empty or the run is cancelled.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use super::store::CustomerStore;
use super::types::{Customer, InputRecord, Outcome, RecordError};

/// Receiving half of the job queue, shared by every worker of a run
pub(crate) type JobQueue = Arc<Mutex<mpsc::Receiver<InputRecord>>>;

pub(crate) struct ImportWorker {
    worker_id: usize,
    store: Arc<dyn CustomerStore>,
    jobs: JobQueue,
    outcomes: mpsc::Sender<Outcome>,
    cancel: CancellationToken,
}

impl ImportWorker {
    pub(crate) fn new(
        worker_id: usize,
        store: Arc<dyn CustomerStore>,
        jobs: JobQueue,
        outcomes: mpsc::Sender<Outcome>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            worker_id,
            store,
            jobs,
            outcomes,
            cancel,
        }
    }

    /// Wait for the next record; `None` once the queue is drained or the run
    /// is cancelled
    async fn next_job(&self) -> Option<InputRecord> {
        let mut jobs = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            guard = self.jobs.lock() => guard,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            job = jobs.recv() => job,
        }
    }

    async fn process(&self, record: InputRecord) -> Outcome {
        let customer = match Customer::try_from(&record) {
            Ok(customer) => customer,
            Err(err) => return Outcome::Failure(err),
        };

        match self.store.persist(customer).await {
            Ok(()) => Outcome::Success,
            Err(source) => Outcome::Failure(RecordError::Store {
                position: record.position,
                source,
            }),
        }
    }

    /// Run until no jobs remain; returns how many records this worker handled
    pub(crate) async fn run(self) -> usize {
        let mut processed = 0usize;

        while let Some(record) = self.next_job().await {
            let position = record.position;
            let outcome = self.process(record).await;
            processed += 1;

            if let Outcome::Failure(ref err) = outcome {
                tracing::debug!(
                    worker_id = self.worker_id,
                    position,
                    error = %err,
                    "Record failed"
                );
            }

            if self.outcomes.send(outcome).await.is_err() {
                tracing::warn!(worker_id = self.worker_id, "Outcome queue closed early");
                break;
            }
        }

        tracing::trace!(worker_id = self.worker_id, processed, "Import worker finished");
        processed
    }
}
