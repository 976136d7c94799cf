// Import Pipeline - wires validator, queue, workers, and ports together

use crate::application::import::ImportService;
use crate::application::queue::PriorityQueue;
use crate::application::validator::Validator;
use crate::application::worker::constants::{
    DEFAULT_NOTIFY_TIMEOUT, DEFAULT_PERSIST_TIMEOUT, DEFAULT_UPSTREAM_TIMEOUT,
    DEFAULT_WORKER_COUNT,
};
use crate::application::worker::{
    shutdown_channel, ShutdownSender, WorkerPool, WorkerPoolHandle,
};
use crate::domain::QueueDepth;
use crate::port::{
    CardCatalog, DeckRepository, IdProvider, ImportQueue, MetricsRecorder, Notifier,
    TimeProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Runtime knobs for the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub workers: usize,
    /// `None` means unbounded
    pub queue_capacity: Option<usize>,
    pub upstream_timeout: Duration,
    pub persist_timeout: Duration,
    pub notify_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            queue_capacity: None,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }
}

/// External collaborators the pipeline depends on
pub struct PipelinePorts {
    pub catalog: Arc<dyn CardCatalog>,
    pub deck_repo: Arc<dyn DeckRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: Arc<dyn MetricsRecorder>,
    pub id_provider: Arc<dyn IdProvider>,
    pub time_provider: Arc<dyn TimeProvider>,
}

/// Running import pipeline
pub struct ImportPipeline {
    service: Arc<ImportService>,
    queue: Arc<PriorityQueue>,
    metrics: Arc<dyn MetricsRecorder>,
    shutdown_tx: ShutdownSender,
    workers: WorkerPoolHandle,
}

impl ImportPipeline {
    /// Build the pipeline and start its workers on the current runtime
    pub fn start(config: PipelineConfig, ports: PipelinePorts) -> Self {
        let queue = Arc::new(match config.queue_capacity {
            Some(capacity) => PriorityQueue::bounded(capacity),
            None => PriorityQueue::new(),
        });

        let validator =
            Validator::new(ports.catalog).with_upstream_timeout(config.upstream_timeout);
        let service = Arc::new(ImportService::new(
            validator,
            queue.clone(),
            ports.notifier.clone(),
            ports.metrics.clone(),
            ports.id_provider,
            ports.time_provider,
        )
        .with_notify_timeout(config.notify_timeout));

        let (shutdown_tx, shutdown_token) = shutdown_channel();
        let workers = WorkerPool::new(
            config.workers,
            queue.clone(),
            ports.deck_repo,
            ports.notifier,
            ports.metrics.clone(),
        )
        .with_persist_timeout(config.persist_timeout)
        .with_notify_timeout(config.notify_timeout)
        .spawn(shutdown_token);

        info!(
            workers = config.workers,
            queue_capacity = ?config.queue_capacity,
            upstream_timeout_ms = config.upstream_timeout.as_millis() as u64,
            persist_timeout_ms = config.persist_timeout.as_millis() as u64,
            notify_timeout_ms = config.notify_timeout.as_millis() as u64,
            "Import pipeline started"
        );

        Self {
            service,
            queue,
            metrics: ports.metrics,
            shutdown_tx,
            workers,
        }
    }

    /// Submission entry point, shareable with transport handlers
    pub fn service(&self) -> Arc<ImportService> {
        Arc::clone(&self.service)
    }

    pub fn queue(&self) -> Arc<dyn ImportQueue> {
        self.queue.clone()
    }

    pub fn metrics(&self) -> Arc<dyn MetricsRecorder> {
        Arc::clone(&self.metrics)
    }

    pub fn depth(&self) -> QueueDepth {
        self.queue.depth()
    }

    /// Stop accepting work, let workers drain the queue, then wait for them
    ///
    /// If the drain outlasts `grace`, idle workers are signalled to stop and
    /// jobs still queued are abandoned.
    pub async fn shutdown(mut self, grace: Duration) {
        self.queue.close();
        info!(remaining = self.queue.depth().total(), "Import queue closed, draining");

        if tokio::time::timeout(grace, self.workers.join()).await.is_err() {
            warn!(
                grace_ms = grace.as_millis() as u64,
                abandoned = self.queue.depth().total(),
                "Drain timed out, stopping workers"
            );
            self.shutdown_tx.shutdown();
            // In-flight jobs still run to completion
            self.workers.join().await;
        }
    }
}
