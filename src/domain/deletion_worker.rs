//! Batched, best-effort soft deletion.
//!
//! Deletion requests are pushed into a bounded channel and collected by a
//! single background worker. The worker hands the accumulated batch to
//! [`LinkRepository::mark_deleted`] every flush interval, and once more when
//! the pipeline is shut down.
//!
//! A batch that fails to apply is logged and dropped. Losing a deletion is
//! acceptable here; retrying with an ever-growing batch is not.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::domain::deletion_request::DeletionRequest;
use crate::domain::repositories::LinkRepository;

/// Handle to a running deletion pipeline.
///
/// The pipeline is either running or stopped. It stops exactly once, on the
/// first call to [`DeletionPipeline::shutdown`]; requests made after that are
/// silently discarded.
pub struct DeletionPipeline {
    sender: mpsc::Sender<DeletionRequest>,
    shutdown_tx: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DeletionPipeline {
    /// Spawns the flush worker. Must be called from within a Tokio runtime.
    pub fn start<R>(repository: Arc<R>, capacity: usize, flush_interval: Duration) -> Self
    where
        R: LinkRepository + ?Sized + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = tokio::spawn(run_deletion_worker(
            receiver,
            shutdown_rx,
            repository,
            flush_interval,
        ));

        info!(
            capacity,
            flush_interval_ms = flush_interval.as_millis() as u64,
            "Deletion pipeline started"
        );

        Self {
            sender,
            shutdown_tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Returns false once shutdown has been requested.
    pub fn is_running(&self) -> bool {
        !*self.shutdown_tx.borrow() && !self.sender.is_closed()
    }

    /// Queues one deletion request per code.
    ///
    /// Waits for channel capacity when the queue is full, but gives up as
    /// soon as the pipeline stops. Returns how many requests were queued.
    pub async fn enqueue(&self, owner_id: u64, codes: Vec<String>) -> usize {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let total = codes.len();
        let mut queued = 0;

        for code in codes {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break,
                sent = self.sender.send(DeletionRequest::new(code, owner_id)) => {
                    if sent.is_err() {
                        break;
                    }
                    queued += 1;
                }
            }
        }

        if queued < total {
            debug!(
                owner_id,
                queued,
                abandoned = total - queued,
                "Deletion pipeline stopped, abandoning requests"
            );
        }

        queued
    }

    /// Stops the pipeline and waits for the final flush.
    ///
    /// Requests already queued are included in the final batch. Calling this
    /// more than once is a no-op.
    pub async fn shutdown(&self) {
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };

        self.shutdown_tx.send_replace(true);

        if let Err(e) = worker.await {
            error!(error = %e, "Deletion worker terminated abnormally");
        }

        info!("Deletion pipeline stopped");
    }
}

/// Collects deletion requests and flushes them on a fixed interval.
///
/// Exits after a final flush when the shutdown signal fires or every sender
/// is gone.
pub async fn run_deletion_worker<R>(
    mut receiver: mpsc::Receiver<DeletionRequest>,
    mut shutdown: watch::Receiver<bool>,
    repository: Arc<R>,
    flush_interval: Duration,
) where
    R: LinkRepository + ?Sized,
{
    let mut ticker = time::interval_at(Instant::now() + flush_interval, flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut batch: Vec<DeletionRequest> = Vec::new();

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                // Err: the pipeline handle was dropped.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => flush_batch(repository.as_ref(), &mut batch).await,
            request = receiver.recv() => match request {
                Some(request) => batch.push(request),
                None => break,
            },
        }
    }

    receiver.close();
    while let Ok(request) = receiver.try_recv() {
        batch.push(request);
    }

    flush_batch(repository.as_ref(), &mut batch).await;
    debug!("Deletion worker exited");
}

async fn flush_batch<R>(repository: &R, batch: &mut Vec<DeletionRequest>)
where
    R: LinkRepository + ?Sized,
{
    if batch.is_empty() {
        return;
    }

    let pending = std::mem::take(batch);
    let size = pending.len();
    debug!(size, "Flushing deletion batch");

    if let Err(e) = repository.mark_deleted(pending).await {
        error!(error = %e, dropped = size, "Failed to apply deletion batch, dropping it");
    }
}
