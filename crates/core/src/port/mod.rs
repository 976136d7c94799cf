// Port Layer - Interfaces for external dependencies

pub mod card_catalog;
pub mod deck_repository;
pub mod id_provider; // For deterministic testing
pub mod import_queue;
pub mod metrics;
pub mod notifier;
pub mod time_provider;

// Re-exports
pub use card_catalog::{CardCatalog, CardStream, UpstreamError};
pub use deck_repository::{DeckRepository, PersistenceError};
pub use id_provider::IdProvider;
pub use import_queue::{ImportQueue, QueueError};
pub use metrics::{CounterSample, MetricsRecorder, NoopMetrics};
pub use notifier::{ImportNotification, ImportStatus, Notifier, NotifyError};
pub use time_provider::TimeProvider;
