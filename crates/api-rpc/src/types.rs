//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use deckforge_core::domain::{CallerRole, Color, ColorSet, DomainError, ImportRequest};
use deckforge_core::port::CounterSample;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// deck.import.v1 - Submit a deck import
#[derive(Debug, Deserialize)]
pub struct ImportDeckRequest {
    pub requester: String,
    pub deck_name: String,
    pub commander_name: String,
    /// Color symbols or names; empty means the commander's identity
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub cards: Option<Vec<String>>,
    /// Present when re-importing into an existing deck
    #[serde(default)]
    pub deck_id: Option<String>,
    /// Role as asserted by the fronting auth layer
    #[serde(default = "default_role")]
    pub role: CallerRole,
}

fn default_role() -> CallerRole {
    CallerRole::Standard
}

impl ImportDeckRequest {
    /// Split into the core request and the caller role
    pub fn into_parts(self) -> Result<(ImportRequest, CallerRole), DomainError> {
        let colors = self
            .colors
            .iter()
            .map(|c| Color::from_str(c))
            .collect::<Result<ColorSet, _>>()?;

        let request = ImportRequest {
            requester: self.requester,
            deck_name: self.deck_name,
            commander_name: self.commander_name,
            colors,
            cards: self.cards,
            deck_id: self.deck_id,
        };
        Ok((request, self.role))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDeckResponse {
    pub job_id: String,
    pub priority: String,
    pub sequence: u64,
    pub state: String,
}

/// admin.stats.v1 - Queue depth and counters (no parameters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub queued_high: usize,
    pub queued_low: usize,
    pub queued_total: usize,
    pub counters: Vec<CounterSample>,
    pub uptime_seconds: i64,
}
