// Import Outcome Domain Model

use crate::domain::card::DeckId;
use serde::{Deserialize, Serialize};

/// Failure taxonomy shared by the validator, the workers and observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportErrorKind {
    InvalidRequest,
    CommanderNotFound,
    IllegalColors,
    UpstreamTimeout,
    UpstreamMalformed,
    UpstreamUnavailable,
    PersistenceError,
    DeckNotFound,
    Internal,
}

impl ImportErrorKind {
    /// Metric label value
    pub fn as_label(&self) -> &'static str {
        match self {
            ImportErrorKind::InvalidRequest => "invalid_request",
            ImportErrorKind::CommanderNotFound => "commander_not_found",
            ImportErrorKind::IllegalColors => "illegal_colors",
            ImportErrorKind::UpstreamTimeout => "upstream_timeout",
            ImportErrorKind::UpstreamMalformed => "upstream_malformed",
            ImportErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ImportErrorKind::PersistenceError => "persistence_error",
            ImportErrorKind::DeckNotFound => "deck_not_found",
            ImportErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ImportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Terminal result of one import job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportOutcome {
    Success {
        deck_id: DeckId,
        cards: Vec<String>,
    },
    Failure {
        kind: ImportErrorKind,
        detail: String,
    },
}

impl ImportOutcome {
    pub fn failure(kind: ImportErrorKind, detail: impl Into<String>) -> Self {
        ImportOutcome::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Success { .. })
    }

    pub fn deck_id(&self) -> Option<&DeckId> {
        match self {
            ImportOutcome::Success { deck_id, .. } => Some(deck_id),
            ImportOutcome::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ImportErrorKind> {
        match self {
            ImportOutcome::Success { .. } => None,
            ImportOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Metric label value: "success" or the failure kind
    pub fn as_label(&self) -> &'static str {
        match self {
            ImportOutcome::Success { .. } => "success",
            ImportOutcome::Failure { kind, .. } => kind.as_label(),
        }
    }

    /// One-line human summary for observers
    pub fn summary(&self) -> String {
        match self {
            ImportOutcome::Success { deck_id, cards } => {
                format!("Deck {} imported with {} cards", deck_id, cards.len())
            }
            ImportOutcome::Failure { kind, detail } => {
                format!("Import failed ({}): {}", kind, detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        let ok = ImportOutcome::Success {
            deck_id: "deck-1".to_string(),
            cards: vec!["Sol Ring".to_string()],
        };
        let failed = ImportOutcome::failure(ImportErrorKind::PersistenceError, "disk full");

        assert_eq!(ok.as_label(), "success");
        assert_eq!(ok.deck_id().map(String::as_str), Some("deck-1"));
        assert_eq!(failed.as_label(), "persistence_error");
        assert_eq!(failed.error_kind(), Some(ImportErrorKind::PersistenceError));
        assert!(failed.summary().contains("disk full"));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let failed = ImportOutcome::failure(ImportErrorKind::UpstreamTimeout, "lookup");
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["status"], "FAILURE");
        assert_eq!(value["kind"], "UPSTREAM_TIMEOUT");
    }
}
