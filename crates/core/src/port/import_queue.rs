// Import Queue Port
// In-memory by default; a broker-backed queue can implement the same contract

use crate::domain::{Admission, PendingImport, PriorityClass, QueueDepth, QueuedJob};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Import queue is full (capacity {capacity})")]
    Full { capacity: usize },

    #[error("Import queue is closed")]
    Closed,
}

/// Priority queue contract
///
/// - Strict priority: no Low job is handed out while a High job waits
/// - FIFO within a class, by admission sequence
/// - Each job is handed to exactly one caller of `dequeue`
#[async_trait]
pub trait ImportQueue: Send + Sync {
    /// Admit a job. Never blocks; a bounded queue rejects with `QueueError::Full`.
    async fn enqueue(
        &self,
        pending: PendingImport,
        priority: PriorityClass,
    ) -> Result<Admission, QueueError>;

    /// Take the next job, suspending while the queue is empty.
    ///
    /// Returns `QueueError::Closed` once the queue is closed and drained.
    /// Cancel-safe: dropping the future never loses a job.
    async fn dequeue(&self) -> Result<QueuedJob, QueueError>;

    /// Current depth per priority class
    fn depth(&self) -> QueueDepth;

    /// Stop admitting jobs and wake idle consumers
    fn close(&self);
}
