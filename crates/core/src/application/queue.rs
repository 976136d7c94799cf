//! In-memory priority queue for import jobs
//!
//! One FIFO lane per priority class behind a single mutex. The admission
//! sequence is taken under the same lock as the insert, so concurrent
//! producers cannot reorder jobs of the same class. The lock is never
//! held across an await.

use crate::domain::{Admission, PendingImport, PriorityClass, QueueDepth, QueuedJob};
use crate::port::{ImportQueue, QueueError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;
use tracing::debug;

#[derive(Default)]
struct QueueState {
    high: VecDeque<QueuedJob>,
    low: VecDeque<QueuedJob>,
    next_sequence: u64,
    closed: bool,
}

impl QueueState {
    fn lane(&mut self, priority: PriorityClass) -> &mut VecDeque<QueuedJob> {
        match priority {
            PriorityClass::High => &mut self.high,
            PriorityClass::Low => &mut self.low,
        }
    }

    fn len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    /// Strict priority: High lane drains before Low is touched
    fn pop(&mut self) -> Option<QueuedJob> {
        self.high.pop_front().or_else(|| self.low.pop_front())
    }
}

/// Strict-priority, FIFO-within-class job queue
pub struct PriorityQueue {
    state: Mutex<QueueState>,
    available: Notify,
    capacity: Option<usize>,
}

impl PriorityQueue {
    /// Unbounded queue
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            available: Notify::new(),
            capacity: None,
        }
    }

    /// Bounded queue; a full queue rejects new jobs
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        // Queue state stays consistent even if a holder panicked:
        // every mutation is a single push/pop.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Non-suspending dequeue
    pub fn try_dequeue(&self) -> Option<QueuedJob> {
        self.lock().pop()
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImportQueue for PriorityQueue {
    async fn enqueue(
        &self,
        pending: PendingImport,
        priority: PriorityClass,
    ) -> Result<Admission, QueueError> {
        let admission = {
            let mut state = self.lock();
            if state.closed {
                return Err(QueueError::Closed);
            }
            if let Some(capacity) = self.capacity {
                if state.len() >= capacity {
                    return Err(QueueError::Full { capacity });
                }
            }

            let sequence = state.next_sequence;
            state.next_sequence += 1;

            let lane = state.lane(priority);
            lane.push_back(QueuedJob::admit(pending, priority, sequence));
            Admission {
                priority,
                sequence,
                depth: lane.len(),
            }
        };

        debug!(
            priority = %priority,
            sequence = admission.sequence,
            depth = admission.depth,
            "Job admitted"
        );

        // One job, one wakeup
        self.available.notify_one();
        Ok(admission)
    }

    async fn dequeue(&self) -> Result<QueuedJob, QueueError> {
        loop {
            // Register interest before checking so a concurrent enqueue
            // or close between the check and the await is not missed.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(job) = state.pop() {
                    return Ok(job);
                }
                if state.closed {
                    return Err(QueueError::Closed);
                }
            }

            notified.await;
        }
    }

    fn depth(&self) -> QueueDepth {
        let state = self.lock();
        QueueDepth {
            high: state.high.len(),
            low: state.low.len(),
        }
    }

    fn close(&self) {
        self.lock().closed = true;
        self.available.notify_waiters();
    }
}
