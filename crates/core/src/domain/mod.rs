// Domain Layer - Pure business logic and entities

pub mod card;
pub mod error;
pub mod import;
pub mod outcome;
pub mod queue;

// Re-exports
pub use card::{color_symbols, CardSummary, Color, ColorSet, CommanderRef, Deck, DeckId};
pub use error::DomainError;
pub use import::{
    CallerRole, ImportRequest, JobId, PendingImport, PriorityClass, QueuedJob, ValidatedImportJob,
};
pub use outcome::{ImportErrorKind, ImportOutcome};
pub use queue::{Admission, QueueDepth};
