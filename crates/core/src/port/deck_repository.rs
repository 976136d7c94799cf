// Deck Repository Port (Persistence Gateway)

use crate::domain::{Deck, DeckId};
use async_trait::async_trait;
use thiserror::Error;

/// Persistence errors. NotFound is kept apart from transient failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Deck not found: {0}")]
    NotFound(DeckId),

    #[error("Persistence unavailable: {0}")]
    Unavailable(String),
}

/// Repository interface for deck records
///
/// Implementations serialize concurrent writes to the same deck id.
#[async_trait]
pub trait DeckRepository: Send + Sync {
    /// Store a new deck and return its identifier
    async fn save(&self, deck: &Deck) -> Result<DeckId, PersistenceError>;

    /// Overwrite an existing deck
    async fn update(&self, id: &DeckId, deck: &Deck) -> Result<(), PersistenceError>;

    /// Find deck by ID
    async fn find_by_id(&self, id: &DeckId) -> Result<Option<Deck>, PersistenceError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock repository behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Store decks in memory
        Success,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Sleep before storing
        Delay(Duration),
    }

    /// In-memory deck repository for testing
    pub struct MockDeckRepository {
        behavior: Arc<Mutex<MockBehavior>>,
        failing_decks: Mutex<HashSet<String>>,
        decks: Mutex<HashMap<DeckId, Deck>>,
        call_count: Mutex<usize>,
    }

    impl MockDeckRepository {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                failing_decks: Mutex::new(HashSet::new()),
                decks: Mutex::new(HashMap::new()),
                call_count: Mutex::new(0),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }
        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }
        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }
        /// Fail only writes of the deck with this name
        pub fn fail_deck(&self, deck_name: impl Into<String>) {
            self.failing_decks.lock().unwrap().insert(deck_name.into());
        }
        /// Seed an existing deck (for update tests)
        pub fn insert(&self, id: impl Into<DeckId>, deck: Deck) {
            self.decks.lock().unwrap().insert(id.into(), deck);
        }
        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
        pub fn stored(&self) -> usize {
            self.decks.lock().unwrap().len()
        }
        pub fn get(&self, id: &str) -> Option<Deck> {
            self.decks.lock().unwrap().get(id).cloned()
        }

        async fn apply_behavior(&self, deck: &Deck) -> Result<(), PersistenceError> {
            *self.call_count.lock().unwrap() += 1;

            if self.failing_decks.lock().unwrap().contains(&deck.name) {
                return Err(PersistenceError::Unavailable(format!(
                    "write rejected for {}",
                    deck.name
                )));
            }

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(PersistenceError::Unavailable(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Delay(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
            }
        }
    }

    #[async_trait]
    impl DeckRepository for MockDeckRepository {
        async fn save(&self, deck: &Deck) -> Result<DeckId, PersistenceError> {
            self.apply_behavior(deck).await?;

            let mut decks = self.decks.lock().unwrap();
            let id = format!("deck-{}", decks.len() + 1);
            decks.insert(id.clone(), deck.clone());
            Ok(id)
        }

        async fn update(&self, id: &DeckId, deck: &Deck) -> Result<(), PersistenceError> {
            self.apply_behavior(deck).await?;

            let mut decks = self.decks.lock().unwrap();
            match decks.get_mut(id) {
                Some(existing) => {
                    *existing = deck.clone();
                    Ok(())
                }
                None => Err(PersistenceError::NotFound(id.clone())),
            }
        }

        async fn find_by_id(&self, id: &DeckId) -> Result<Option<Deck>, PersistenceError> {
            Ok(self.decks.lock().unwrap().get(id).cloned())
        }
    }
}
