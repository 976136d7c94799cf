// Import Service - validate, stamp, and admit import requests

use crate::application::validator::Validator;
use crate::application::worker::constants::DEFAULT_NOTIFY_TIMEOUT;
use crate::application::worker::deliver_isolated;
use crate::domain::{CallerRole, ImportRequest, JobId, PendingImport, PriorityClass};
use crate::error::{AppError, Result};
use crate::port::metrics::{NOTIFY_FAILURES_TOTAL, REJECTED_TOTAL, SUBMITTED_TOTAL};
use crate::port::{
    IdProvider, ImportNotification, ImportQueue, ImportStatus, MetricsRecorder, Notifier,
    QueueError, TimeProvider,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Acknowledgement returned to the caller once a job is queued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAck {
    pub job_id: JobId,
    pub priority: PriorityClass,
    pub sequence: u64,
    pub state: String,
}

/// Import Service
///
/// Validation runs on the caller's task; only valid jobs reach the queue.
/// Observers see `Queued` before any worker can pick the job up.
pub struct ImportService {
    validator: Validator,
    queue: Arc<dyn ImportQueue>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<dyn MetricsRecorder>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    notify_timeout: Duration,
}

impl ImportService {
    pub fn new(
        validator: Validator,
        queue: Arc<dyn ImportQueue>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<dyn MetricsRecorder>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            validator,
            queue,
            notifier,
            metrics,
            id_provider,
            time_provider,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Validate the request and admit it at the caller's priority
    pub async fn submit(
        &self,
        request: ImportRequest,
        role: CallerRole,
    ) -> Result<ImportAck> {
        let job = match self.validator.validate(&request).await {
            Ok(job) => job,
            Err(e) => {
                warn!(
                    requester = %request.requester,
                    deck = %request.deck_name,
                    kind = %e.kind(),
                    error = %e,
                    "Import request rejected"
                );
                self.metrics
                    .increment(REJECTED_TOTAL, &[("reason", e.kind().as_label())]);
                return Err(AppError::Validation(e));
            }
        };

        let priority = PriorityClass::for_role(role);
        let pending = PendingImport {
            id: self.id_provider.generate_id(),
            submitted_at: self.time_provider.now_millis(),
            job,
        };
        let job_id = pending.id.clone();
        let requester = pending.job.requester.clone();
        let deck_id = pending.job.deck_id.clone();

        // Published before admission; a worker may finish the job immediately
        self.publish(ImportNotification {
            job_id: job_id.clone(),
            requester: requester.clone(),
            deck_id: deck_id.clone(),
            status: ImportStatus::Queued,
            error_kind: None,
            summary: format!("queued at {} priority", priority.as_label()),
        })
        .await;

        let admission = match self.queue.enqueue(pending, priority).await {
            Ok(admission) => admission,
            Err(e) => {
                let reason = match e {
                    QueueError::Full { .. } => "queue_full",
                    QueueError::Closed => "queue_closed",
                };
                warn!(job_id = %job_id, error = %e, "Import job not admitted");
                self.metrics.increment(REJECTED_TOTAL, &[("reason", reason)]);

                let err = AppError::Queue(e);
                self.publish(ImportNotification {
                    job_id,
                    requester,
                    deck_id,
                    status: ImportStatus::Failed,
                    error_kind: Some(err.kind()),
                    summary: err.to_string(),
                })
                .await;
                return Err(err);
            }
        };

        self.metrics
            .increment(SUBMITTED_TOTAL, &[("priority", priority.as_label())]);
        info!(
            job_id = %job_id,
            requester = %requester,
            priority = %priority,
            sequence = admission.sequence,
            depth = admission.depth,
            "Import job queued"
        );

        Ok(ImportAck {
            job_id,
            priority,
            sequence: admission.sequence,
            state: "QUEUED".to_string(),
        })
    }

    /// Best-effort delivery; never fails the submission
    async fn publish(&self, notification: ImportNotification) {
        let job_id = notification.job_id.clone();
        let status = notification.status;

        if let Err(e) =
            deliver_isolated(Arc::clone(&self.notifier), notification, self.notify_timeout).await
        {
            warn!(
                job_id = %job_id,
                status = status.as_label(),
                error = %e,
                "Import notification not delivered"
            );
            self.metrics
                .increment(NOTIFY_FAILURES_TOTAL, &[("status", status.as_label())]);
        }
    }
}
