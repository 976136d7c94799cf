// Deckforge Infrastructure - Scryfall Adapter
// Implements: CardCatalog

mod catalog;
mod model;

pub use catalog::{ScryfallCatalog, ScryfallConfig, DEFAULT_SCRYFALL_URL};
