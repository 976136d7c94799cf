// Worker Pool - N independent import workers on one shared queue

use super::{ImportWorker, ShutdownToken};
use crate::port::{DeckRepository, ImportQueue, MetricsRecorder, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Spawns and owns the import workers
///
/// Ordering is a queue property: adding workers raises throughput but
/// completion order across workers is not guaranteed.
pub struct WorkerPool {
    workers: usize,
    queue: Arc<dyn ImportQueue>,
    deck_repo: Arc<dyn DeckRepository>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<dyn MetricsRecorder>,
    persist_timeout: Duration,
    notify_timeout: Duration,
}

impl WorkerPool {
    pub fn new(
        workers: usize,
        queue: Arc<dyn ImportQueue>,
        deck_repo: Arc<dyn DeckRepository>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            workers: workers.max(1),
            queue,
            deck_repo,
            notifier,
            metrics,
            persist_timeout: super::constants::DEFAULT_PERSIST_TIMEOUT,
            notify_timeout: super::constants::DEFAULT_NOTIFY_TIMEOUT,
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

    pub fn size(&self) -> usize {
        self.workers
    }

    /// Start all workers on the current tokio runtime
    pub fn spawn(&self, shutdown: ShutdownToken) -> WorkerPoolHandle {
        let mut tasks = JoinSet::new();

        for id in 1..=self.workers {
            let worker = ImportWorker::new(
                id,
                Arc::clone(&self.queue),
                Arc::clone(&self.deck_repo),
                Arc::clone(&self.notifier),
                Arc::clone(&self.metrics),
            )
            .with_persist_timeout(self.persist_timeout)
            .with_notify_timeout(self.notify_timeout);
            let shutdown = shutdown.clone();

            tasks.spawn(async move {
                if let Err(e) = worker.run(shutdown).await {
                    error!(worker = id, error = ?e, "Import worker failed");
                }
            });
        }

        info!(workers = self.workers, "Import worker pool started");
        WorkerPoolHandle { tasks }
    }
}

/// Running workers
pub struct WorkerPoolHandle {
    tasks: JoinSet<()>,
}

impl WorkerPoolHandle {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every worker to exit
    ///
    /// Cancel-safe: a timed-out join can be retried.
    pub async fn join(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!(error = ?e, "Import worker task aborted");
            }
        }
        info!("Import worker pool stopped");
    }
}
