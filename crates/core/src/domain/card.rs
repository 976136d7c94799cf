// Card Domain Model

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Deck identifier assigned by the persistence gateway
pub type DeckId = String;

/// Oracle text marker for cards exempt from the singleton rule
pub const REPEATABLE_MARKER: &str = "A deck can have any number of cards named";

/// Type line marker for basic lands
pub const BASIC_LAND_MARKER: &str = "Basic Land";

/// Mana color (WUBRG order)
///
/// Serializes as its symbol; deserializes through `FromStr`, so JSON
/// accepts the same spellings as every other input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// Single-letter color symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Color::White => "W",
            Color::Blue => "U",
            Color::Black => "B",
            Color::Red => "R",
            Color::Green => "G",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Color {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "W" | "WHITE" => Ok(Color::White),
            "U" | "BLUE" => Ok(Color::Blue),
            "B" | "BLACK" => Ok(Color::Black),
            "R" | "RED" => Ok(Color::Red),
            "G" | "GREEN" => Ok(Color::Green),
            other => Err(DomainError::UnknownColor(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered set of colors
pub type ColorSet = BTreeSet<Color>;

/// Render a color set as concatenated symbols ("WUBG")
pub fn color_symbols(colors: &ColorSet) -> String {
    colors.iter().map(Color::symbol).collect()
}

/// Commander reference data as returned by the card catalog
///
/// Color identity is kept as raw symbols; interpreting them is the
/// validator's job so malformed upstream data surfaces as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommanderRef {
    pub name: String,
    pub color_identity: Option<Vec<String>>,
}

impl CommanderRef {
    pub fn new(name: impl Into<String>, color_identity: &[&str]) -> Self {
        Self {
            name: name.into(),
            color_identity: Some(color_identity.iter().map(|c| c.to_string()).collect()),
        }
    }
}

/// One entry of a color-based card search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub name: String,
    pub type_line: String,
    pub oracle_text: Option<String>,
}

impl CardSummary {
    pub fn new(name: impl Into<String>, type_line: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_line: type_line.into(),
            oracle_text: None,
        }
    }

    pub fn with_oracle_text(mut self, text: impl Into<String>) -> Self {
        self.oracle_text = Some(text.into());
        self
    }

    pub fn is_basic_land(&self) -> bool {
        self.type_line.contains(BASIC_LAND_MARKER)
    }

    /// Cards whose rules text lifts the singleton restriction
    pub fn is_repeatable(&self) -> bool {
        self.oracle_text
            .as_deref()
            .is_some_and(|text| text.contains(REPEATABLE_MARKER))
    }
}

/// Deck record handed to the persistence gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub owner: String,
    pub commander_name: String,
    pub colors: Vec<Color>,
    pub cards: Vec<String>,
}
