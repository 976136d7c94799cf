// Scryfall wire types

use deckforge_core::domain::{CardSummary, CommanderRef};
use serde::Deserialize;

/// Card object, trimmed to the fields the pipeline reads
#[derive(Debug, Deserialize)]
pub(crate) struct ScryfallCard {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub type_line: String,
    pub oracle_text: Option<String>,
    pub color_identity: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub card_faces: Option<Vec<CardFace>>,
}

/// One face of a multi-faced card
#[derive(Debug, Deserialize)]
pub(crate) struct CardFace {
    pub oracle_text: Option<String>,
}

/// Paginated list object returned by /cards/search
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    pub data: Vec<ScryfallCard>,
    #[serde(default)]
    pub has_more: bool,
    pub next_page: Option<String>,
}

impl ScryfallCard {
    /// Identity falls back to printed colors for older payloads
    pub fn into_commander(self) -> CommanderRef {
        CommanderRef {
            name: self.name,
            color_identity: self.color_identity.or(self.colors),
        }
    }

    pub fn into_summary(self) -> CardSummary {
        // Multi-faced cards carry rules text per face
        let oracle_text = self.oracle_text.or_else(|| {
            let faces: Vec<String> = self
                .card_faces
                .unwrap_or_default()
                .into_iter()
                .filter_map(|face| face.oracle_text)
                .collect();
            (!faces.is_empty()).then(|| faces.join("\n"))
        });

        CardSummary {
            name: self.name,
            type_line: self.type_line,
            oracle_text,
        }
    }
}

impl SearchPage {
    /// Next page URL, only when the list says there is one
    pub fn next(&self) -> Option<String> {
        if self.has_more {
            self.next_page.clone()
        } else {
            None
        }
    }
}
