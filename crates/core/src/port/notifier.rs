// Notification Dispatcher Port
// Best-effort fan-out of import status to observers

use crate::domain::{DeckId, ImportErrorKind, JobId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status carried by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Queued,
    Completed,
    Failed,
}

impl ImportStatus {
    /// Metric label value
    pub fn as_label(&self) -> &'static str {
        match self {
            ImportStatus::Queued => "queued",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
        }
    }
}

/// Event delivered to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportNotification {
    pub job_id: JobId,
    pub requester: String,
    pub deck_id: Option<DeckId>,
    pub status: ImportStatus,
    pub error_kind: Option<ImportErrorKind>,
    pub summary: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Notification delivery timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Notifier panicked: {0}")]
    Panicked(String),
}

/// Notifier trait
///
/// Delivery failures are reported but never roll back persistence.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &ImportNotification) -> Result<(), NotifyError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// How the mock answers a delivery
    #[derive(Debug, Clone)]
    pub enum DeliveryBehavior {
        Deliver,
        Fail(String),
        Panic(String),
        /// Never completes
        Hang,
    }

    /// Records every notification; can be told to misbehave on delivery
    pub struct RecordingNotifier {
        sent: Mutex<Vec<ImportNotification>>,
        behavior: DeliveryBehavior,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::with_behavior(DeliveryBehavior::Deliver)
        }
        pub fn new_failing(message: impl Into<String>) -> Self {
            Self::with_behavior(DeliveryBehavior::Fail(message.into()))
        }
        pub fn new_panicking(message: impl Into<String>) -> Self {
            Self::with_behavior(DeliveryBehavior::Panic(message.into()))
        }
        pub fn new_hanging() -> Self {
            Self::with_behavior(DeliveryBehavior::Hang)
        }
        pub fn with_behavior(behavior: DeliveryBehavior) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                behavior,
            }
        }
        pub fn sent(&self) -> Vec<ImportNotification> {
            self.sent.lock().unwrap().clone()
        }
        pub fn with_status(&self, status: ImportStatus) -> Vec<ImportNotification> {
            self.sent()
                .into_iter()
                .filter(|n| n.status == status)
                .collect()
        }
    }

    impl Default for RecordingNotifier {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notification: &ImportNotification) -> Result<(), NotifyError> {
            // Record the attempt even when delivery "fails"
            self.sent.lock().unwrap().push(notification.clone());
            match &self.behavior {
                DeliveryBehavior::Deliver => Ok(()),
                DeliveryBehavior::Fail(msg) => Err(NotifyError::Delivery(msg.clone())),
                DeliveryBehavior::Panic(msg) => panic!("{}", msg),
                DeliveryBehavior::Hang => futures::future::pending().await,
            }
        }
    }
}
