// Import Worker - dequeue, persist, report

pub mod constants;
mod panic_guard;
mod pool;
mod shutdown;

use constants::*;
pub use panic_guard::{deliver_isolated, join_error_detail};
pub use pool::{WorkerPool, WorkerPoolHandle};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::domain::{ImportErrorKind, ImportOutcome, QueuedJob};
use crate::error::Result;
use crate::port::metrics::{JOBS_TOTAL, NOTIFY_FAILURES_TOTAL};
use crate::port::{
    DeckRepository, ImportNotification, ImportQueue, ImportStatus, MetricsRecorder, Notifier,
    PersistenceError, QueueError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Worker processes import jobs from the shared priority queue
pub struct ImportWorker {
    id: usize,
    queue: Arc<dyn ImportQueue>,
    deck_repo: Arc<dyn DeckRepository>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<dyn MetricsRecorder>,
    persist_timeout: Duration,
    notify_timeout: Duration,
}

impl ImportWorker {
    pub fn new(
        id: usize,
        queue: Arc<dyn ImportQueue>,
        deck_repo: Arc<dyn DeckRepository>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            id,
            queue,
            deck_repo,
            notifier,
            metrics,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Run worker loop until shutdown or until the queue is closed and drained
    ///
    /// A job that has been dequeued always runs to completion; shutdown is
    /// only observed while waiting for work.
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(worker = self.id, "Import worker started");
        loop {
            if shutdown.is_shutdown() {
                info!(worker = self.id, "Import worker shutting down");
                break;
            }

            let next = tokio::select! {
                next = self.queue.dequeue() => next,
                _ = shutdown.wait() => {
                    info!(worker = self.id, "Import worker interrupted while idle");
                    break;
                }
            };

            match next {
                Ok(job) => {
                    self.process(job).await;
                }
                Err(QueueError::Closed) => {
                    info!(worker = self.id, "Import queue closed and drained");
                    break;
                }
                Err(e) => {
                    error!(worker = self.id, error = %e, "Worker error");
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => {
                            info!(
                                worker = self.id,
                                "Import worker interrupted during error recovery"
                            );
                            break;
                        }
                    }
                }
            }
        }
        info!(worker = self.id, "Import worker stopped");
        Ok(())
    }

    /// Process one job and report its outcome
    ///
    /// Never fails: every error, panic included, becomes a Failure outcome.
    pub async fn process(&self, job: QueuedJob) -> ImportOutcome {
        info!(
            worker = self.id,
            job_id = %job.id,
            priority = %job.priority,
            sequence = job.sequence,
            deck = %job.job.deck_name,
            "Processing import job"
        );

        let outcome = self.persist(&job).await;

        match &outcome {
            ImportOutcome::Success { deck_id, cards } => info!(
                worker = self.id,
                job_id = %job.id,
                deck_id = %deck_id,
                cards = cards.len(),
                "Import job completed"
            ),
            ImportOutcome::Failure { kind, detail } => error!(
                worker = self.id,
                job_id = %job.id,
                kind = %kind,
                detail = %detail,
                "Import job failed"
            ),
        }

        self.report(&job, &outcome).await;
        outcome
    }

    /// Persist the deck in an isolated task, bounded by the persist timeout.
    /// No automatic retry: resubmission is the caller's decision.
    async fn persist(&self, job: &QueuedJob) -> ImportOutcome {
        let deck_repo = Arc::clone(&self.deck_repo);
        let deck = job.job.to_deck();
        let target = job.job.deck_id.clone();
        let timeout = self.persist_timeout;

        // Panic isolation: a panicking gateway must not take the worker down
        let handle = tokio::task::spawn(async move {
            let write = async move {
                match target {
                    Some(id) => {
                        let updated = deck_repo.update(&id, &deck).await;
                        updated.map(|_| id)
                    }
                    None => deck_repo.save(&deck).await,
                }
            };
            tokio::time::timeout(timeout, write).await
        });

        match handle.await {
            Ok(Ok(Ok(deck_id))) => ImportOutcome::Success {
                deck_id,
                cards: job.job.cards.clone(),
            },
            Ok(Ok(Err(PersistenceError::NotFound(id)))) => ImportOutcome::failure(
                ImportErrorKind::DeckNotFound,
                format!("deck {} does not exist", id),
            ),
            Ok(Ok(Err(e))) => {
                ImportOutcome::failure(ImportErrorKind::PersistenceError, e.to_string())
            }
            Ok(Err(_elapsed)) => ImportOutcome::failure(
                ImportErrorKind::UpstreamTimeout,
                format!("persistence timed out after {}ms", timeout.as_millis()),
            ),
            Err(join_err) => {
                ImportOutcome::failure(ImportErrorKind::Internal, join_error_detail(join_err))
            }
        }
    }

    /// Notify observers and count the outcome. Both are best-effort;
    /// delivery runs isolated and time-bounded like persistence.
    async fn report(&self, job: &QueuedJob, outcome: &ImportOutcome) {
        self.metrics.increment(
            JOBS_TOTAL,
            &[
                ("priority", job.priority.as_label()),
                ("outcome", outcome.as_label()),
            ],
        );

        let notification = ImportNotification {
            job_id: job.id.clone(),
            requester: job.job.requester.clone(),
            deck_id: outcome.deck_id().cloned().or_else(|| job.job.deck_id.clone()),
            status: if outcome.is_success() {
                ImportStatus::Completed
            } else {
                ImportStatus::Failed
            },
            error_kind: outcome.error_kind(),
            summary: outcome.summary(),
        };

        let status = notification.status;
        let delivered = deliver_isolated(
            Arc::clone(&self.notifier),
            notification,
            self.notify_timeout,
        )
        .await;
        if let Err(e) = delivered {
            // Persistence stays authoritative; a lost notification is only logged
            warn!(job_id = %job.id, error = %e, "Failed to deliver import notification");
            self.metrics
                .increment(NOTIFY_FAILURES_TOTAL, &[("status", status.as_label())]);
        }
    }
}
