// In-memory MetricsRecorder - labeled counters kept in process

use deckforge_core::port::{CounterSample, MetricsRecorder};
use std::collections::BTreeMap;
use std::sync::Mutex;

type CounterKey = (String, Vec<(String, String)>);

/// Aggregating counter store
///
/// Label order does not matter: labels are sorted before keying.
#[derive(Default)]
pub struct InMemoryMetrics {
    counters: Mutex<BTreeMap<CounterKey, u64>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every series of `counter`
    pub fn total(&self, counter: &str) -> u64 {
        self.lock()
            .iter()
            .filter(|((name, _), _)| name == counter)
            .map(|(_, value)| *value)
            .sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<CounterKey, u64>> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MetricsRecorder for InMemoryMetrics {
    fn increment(&self, counter: &str, labels: &[(&str, &str)]) {
        let mut labels: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        labels.sort();

        *self.lock().entry((counter.to_string(), labels)).or_insert(0) += 1;
    }

    fn snapshot(&self) -> Vec<CounterSample> {
        self.lock()
            .iter()
            .map(|((name, labels), value)| CounterSample {
                name: name.clone(),
                labels: labels.clone(),
                value: *value,
            })
            .collect()
    }
}
