// Deckforge Infrastructure - In-process Adapters
// Implements: Notifier, MetricsRecorder

mod metrics;
mod notifier;

pub use metrics::InMemoryMetrics;
pub use notifier::{BroadcastNotifier, DEFAULT_NOTIFY_BUFFER};
