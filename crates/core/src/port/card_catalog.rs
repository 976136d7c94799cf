// Card Catalog Port
// Abstraction over the third-party card lookup API

use crate::domain::{CardSummary, ColorSet, CommanderRef};
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// Lazy, finite, non-restartable sequence of search results
pub type CardStream = BoxStream<'static, Result<CardSummary, UpstreamError>>;

/// Catalog errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Card catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed card catalog response: {0}")]
    Malformed(String),

    #[error("Card catalog request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Card Catalog trait
///
/// Implementations:
/// - ScryfallCatalog: HTTP client for api.scryfall.com
/// - MockCardCatalog: in-memory fixtures for tests
#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Look up a commander by exact name
    ///
    /// Returns `Ok(None)` when the catalog has no such card.
    /// Must be idempotent and side-effect free.
    async fn lookup_commander(&self, name: &str) -> Result<Option<CommanderRef>, UpstreamError>;

    /// Search cards by color, in the catalog's iteration order
    ///
    /// The stream is consumed at most once; callers stop pulling when
    /// they have enough cards.
    async fn search_cards(&self, colors: &ColorSet) -> Result<CardStream, UpstreamError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// In-memory catalog with a fixed search order
    pub struct MockCardCatalog {
        commanders: HashMap<String, CommanderRef>,
        pool: Vec<CardSummary>,
        lookup_delay: Option<Duration>,
        lookup_error: Option<UpstreamError>,
        lookup_calls: AtomicUsize,
        pulled: Arc<AtomicUsize>,
        searched_colors: Mutex<Vec<ColorSet>>,
    }

    impl MockCardCatalog {
        pub fn new() -> Self {
            Self {
                commanders: HashMap::new(),
                pool: Vec::new(),
                lookup_delay: None,
                lookup_error: None,
                lookup_calls: AtomicUsize::new(0),
                pulled: Arc::new(AtomicUsize::new(0)),
                searched_colors: Mutex::new(Vec::new()),
            }
        }

        pub fn with_commander(mut self, commander: CommanderRef) -> Self {
            self.commanders
                .insert(commander.name.to_lowercase(), commander);
            self
        }

        /// Cards returned by every search, in this order
        pub fn with_pool(mut self, pool: Vec<CardSummary>) -> Self {
            self.pool = pool;
            self
        }

        pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
            self.lookup_delay = Some(delay);
            self
        }

        pub fn with_lookup_error(mut self, error: UpstreamError) -> Self {
            self.lookup_error = Some(error);
            self
        }

        pub fn lookup_calls(&self) -> usize {
            self.lookup_calls.load(Ordering::SeqCst)
        }

        /// Number of search results actually pulled from streams
        pub fn pulled(&self) -> usize {
            self.pulled.load(Ordering::SeqCst)
        }

        pub fn searched_colors(&self) -> Vec<ColorSet> {
            self.searched_colors.lock().unwrap().clone()
        }
    }

    impl Default for MockCardCatalog {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl CardCatalog for MockCardCatalog {
        async fn lookup_commander(
            &self,
            name: &str,
        ) -> Result<Option<CommanderRef>, UpstreamError> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.lookup_delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = &self.lookup_error {
                return Err(err.clone());
            }
            Ok(self.commanders.get(&name.to_lowercase()).cloned())
        }

        async fn search_cards(&self, colors: &ColorSet) -> Result<CardStream, UpstreamError> {
            self.searched_colors.lock().unwrap().push(colors.clone());

            let pulled = Arc::clone(&self.pulled);
            let stream = futures::stream::iter(self.pool.clone()).map(move |card| {
                pulled.fetch_add(1, Ordering::SeqCst);
                Ok(card)
            });
            Ok(stream.boxed())
        }
    }
}
