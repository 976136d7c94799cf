// Broadcast Notifier - in-process fan-out of import status events

use async_trait::async_trait;
use deckforge_core::port::{ImportNotification, Notifier, NotifyError};
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of events a slow subscriber may lag behind
pub const DEFAULT_NOTIFY_BUFFER: usize = 256;

/// Publishes every notification to all current subscribers
///
/// Having no subscribers is not a delivery failure; the event is dropped.
/// A subscriber that lags past the buffer loses the oldest events.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<ImportNotification>,
}

impl BroadcastNotifier {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ImportNotification> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_BUFFER)
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn notify(&self, notification: &ImportNotification) -> Result<(), NotifyError> {
        if self.tx.receiver_count() == 0 {
            debug!(job_id = %notification.job_id, "No notification subscribers");
            return Ok(());
        }

        self.tx
            .send(notification.clone())
            .map(|receivers| {
                debug!(
                    job_id = %notification.job_id,
                    status = notification.status.as_label(),
                    receivers,
                    "Notification published"
                );
            })
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}
