// Metrics Recorder Port
// Injected instead of global counters so tests can substitute a stub

use serde::{Deserialize, Serialize};

/// Jobs that reached a terminal outcome, labeled by priority and outcome
pub const JOBS_TOTAL: &str = "deck_import_jobs_total";

/// Requests accepted into the queue, labeled by priority
pub const SUBMITTED_TOTAL: &str = "deck_import_submitted_total";

/// Requests refused at submission, labeled by reason
pub const REJECTED_TOTAL: &str = "deck_import_rejected_total";

/// Notifications that could not be delivered
pub const NOTIFY_FAILURES_TOTAL: &str = "deck_import_notify_failures_total";

/// Point-in-time counter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: u64,
}

/// Fire-and-forget counter recorder
pub trait MetricsRecorder: Send + Sync {
    fn increment(&self, counter: &str, labels: &[(&str, &str)]);

    /// Current counter values, for recorders that keep them
    fn snapshot(&self) -> Vec<CounterSample> {
        Vec::new()
    }
}

/// Recorder that drops everything
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn increment(&self, _counter: &str, _labels: &[(&str, &str)]) {}
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records raw increment events in call order
    #[derive(Default)]
    pub struct RecordingMetrics {
        events: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl RecordingMetrics {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of increments of `counter` whose labels include all of `labels`
        pub fn count(&self, counter: &str, labels: &[(&str, &str)]) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(name, recorded)| {
                    name == counter
                        && labels
                            .iter()
                            .all(|(k, v)| recorded.iter().any(|(rk, rv)| rk == k && rv == v))
                })
                .count()
        }
    }

    impl MetricsRecorder for RecordingMetrics {
        fn increment(&self, counter: &str, labels: &[(&str, &str)]) {
            let labels = labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.events
                .lock()
                .unwrap()
                .push((counter.to_string(), labels));
        }
    }
}
