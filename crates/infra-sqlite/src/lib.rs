// Deckforge Infrastructure - SQLite Adapter
// Implements: DeckRepository

mod connection;
mod deck_repository;
mod migration;

pub use connection::create_pool;
pub use deck_repository::SqliteDeckRepository;
pub use migration::run_migrations;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for PersistenceError here)
