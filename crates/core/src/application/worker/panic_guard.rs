// Panic isolation helpers for import workers
use crate::port::{ImportNotification, Notifier, NotifyError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::error;

/// Extract a readable message from a failed job task
///
/// Jobs run in their own tokio task; a panic surfaces here as a
/// `JoinError` instead of unwinding through the worker loop.
pub fn join_error_detail(join_err: JoinError) -> String {
    if join_err.is_cancelled() {
        return "import task was cancelled".to_string();
    }

    let payload = join_err.into_panic();
    let panic_msg = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    };

    error!(panic_msg = %panic_msg, "Import task panicked");
    format!("import task panicked: {}", panic_msg)
}

/// Deliver a notification in its own task, bounded by `limit`
///
/// A notifier that panics or never answers costs one notification,
/// never the caller.
pub async fn deliver_isolated(
    notifier: Arc<dyn Notifier>,
    notification: ImportNotification,
    limit: Duration,
) -> Result<(), NotifyError> {
    let handle = tokio::task::spawn(async move {
        tokio::time::timeout(limit, notifier.notify(&notification)).await
    });

    match handle.await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(NotifyError::Timeout {
            timeout_ms: limit.as_millis() as u64,
        }),
        Err(join_err) => Err(NotifyError::Panicked(join_error_detail(join_err))),
    }
}
