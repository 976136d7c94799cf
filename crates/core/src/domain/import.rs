// Import Job Domain Model

use crate::domain::card::{ColorSet, Deck, DeckId};
use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Import job ID (UUID v4)
pub type JobId = String;

/// Caller role as resolved by the (external) auth layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    Elevated,
    Standard,
}

/// Queue placement class. Derived from the caller, never from job content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityClass {
    Low,
    High,
}

impl PriorityClass {
    pub fn for_role(role: CallerRole) -> Self {
        match role {
            CallerRole::Elevated => PriorityClass::High,
            CallerRole::Standard => PriorityClass::Low,
        }
    }

    /// Metric label value
    pub fn as_label(&self) -> &'static str {
        match self {
            PriorityClass::High => "high",
            PriorityClass::Low => "low",
        }
    }
}

impl std::fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityClass::High => write!(f, "HIGH"),
            PriorityClass::Low => write!(f, "LOW"),
        }
    }
}

/// Client-submitted import request. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub requester: String,
    pub deck_name: String,
    pub commander_name: String,
    /// Empty means "use the commander's full color identity"
    #[serde(default)]
    pub colors: ColorSet,
    /// Explicit card list, used verbatim when present
    #[serde(default)]
    pub cards: Option<Vec<String>>,
    /// Existing deck to overwrite instead of creating a new one
    #[serde(default)]
    pub deck_id: Option<DeckId>,
}

impl ImportRequest {
    pub fn new(
        requester: impl Into<String>,
        deck_name: impl Into<String>,
        commander_name: impl Into<String>,
    ) -> Self {
        Self {
            requester: requester.into(),
            deck_name: deck_name.into(),
            commander_name: commander_name.into(),
            colors: ColorSet::new(),
            cards: None,
            deck_id: None,
        }
    }

    pub fn with_colors(mut self, colors: impl IntoIterator<Item = crate::domain::Color>) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    pub fn with_cards(mut self, cards: Vec<String>) -> Self {
        self.cards = Some(cards);
        self
    }

    pub fn for_deck(mut self, deck_id: impl Into<DeckId>) -> Self {
        self.deck_id = Some(deck_id.into());
        self
    }

    /// Reject requests that cannot be interpreted before touching the catalog
    pub fn check(&self) -> Result<()> {
        if self.requester.trim().is_empty() {
            return Err(DomainError::InvalidRequest("requester is empty".to_string()));
        }
        if self.deck_name.trim().is_empty() {
            return Err(DomainError::InvalidRequest("deck name is empty".to_string()));
        }
        if self.commander_name.trim().is_empty() {
            return Err(DomainError::InvalidRequest(
                "commander name is empty".to_string(),
            ));
        }
        if let Some(id) = &self.deck_id {
            if id.trim().is_empty() {
                return Err(DomainError::InvalidRequest("deck id is empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Import request resolved against reference data.
///
/// Invariant: `colors` is a subset of `commander_identity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedImportJob {
    pub requester: String,
    pub deck_name: String,
    pub deck_id: Option<DeckId>,
    pub commander_name: String,
    pub commander_identity: ColorSet,
    pub colors: ColorSet,
    pub cards: Vec<String>,
}

impl ValidatedImportJob {
    pub fn to_deck(&self) -> Deck {
        Deck {
            name: self.deck_name.clone(),
            owner: self.requester.clone(),
            commander_name: self.commander_name.clone(),
            colors: self.colors.iter().copied().collect(),
            cards: self.cards.clone(),
        }
    }
}

/// Validated job stamped by the submission path, before queue admission
#[derive(Debug, Clone)]
pub struct PendingImport {
    pub id: JobId,
    pub submitted_at: i64, // epoch ms
    pub job: ValidatedImportJob,
}

/// Job owned by the queue, then by exactly one worker
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub id: JobId,
    pub priority: PriorityClass,
    /// Admission sequence, assigned under the queue lock
    pub sequence: u64,
    pub submitted_at: i64,
    pub job: ValidatedImportJob,
}

impl QueuedJob {
    pub fn admit(pending: PendingImport, priority: PriorityClass, sequence: u64) -> Self {
        Self {
            id: pending.id,
            priority,
            sequence,
            submitted_at: pending.submitted_at,
            job: pending.job,
        }
    }
}
