//! Validator - Resolves an import request against card catalog reference data
//!
//! - Commander must exist in the catalog
//! - Requested colors must lie inside the commander's color identity
//!   (hard rejection, colors are never silently stripped)
//! - Card list is taken verbatim or derived from a color search with
//!   singleton dedup and a fixed deck-size cap

use crate::application::worker::constants::{DECK_CARD_LIMIT, DEFAULT_UPSTREAM_TIMEOUT};
use crate::domain::{
    color_symbols, Color, ColorSet, DomainError, ImportErrorKind, ImportRequest,
    ValidatedImportJob,
};
use crate::port::{CardCatalog, UpstreamError};
use futures::StreamExt;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    InvalidRequest(#[from] DomainError),

    #[error("Commander not found: {0}")]
    CommanderNotFound(String),

    #[error("Colors {illegal} are outside {commander}'s color identity {identity}")]
    IllegalColors {
        commander: String,
        illegal: String,
        identity: String,
    },

    #[error("Card catalog {operation} timed out after {timeout_ms}ms")]
    UpstreamTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Malformed card catalog data: {0}")]
    UpstreamMalformed(String),

    #[error("Card catalog unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl ValidationError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ValidationError::InvalidRequest(_) => ImportErrorKind::InvalidRequest,
            ValidationError::CommanderNotFound(_) => ImportErrorKind::CommanderNotFound,
            ValidationError::IllegalColors { .. } => ImportErrorKind::IllegalColors,
            ValidationError::UpstreamTimeout { .. } => ImportErrorKind::UpstreamTimeout,
            ValidationError::UpstreamMalformed(_) => ImportErrorKind::UpstreamMalformed,
            ValidationError::UpstreamUnavailable(_) => ImportErrorKind::UpstreamUnavailable,
        }
    }
}

impl ValidationError {
    /// Catalog failure during `operation`
    fn upstream(operation: &'static str, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unavailable(msg) => ValidationError::UpstreamUnavailable(msg),
            UpstreamError::Malformed(msg) => ValidationError::UpstreamMalformed(msg),
            UpstreamError::Timeout { timeout_ms } => {
                warn!(operation, timeout_ms, "Card catalog request timed out");
                ValidationError::UpstreamTimeout {
                    operation,
                    timeout_ms,
                }
            }
        }
    }
}

/// Validator for import requests
pub struct Validator {
    catalog: Arc<dyn CardCatalog>,
    upstream_timeout: Duration,
    card_limit: usize,
}

impl Validator {
    pub fn new(catalog: Arc<dyn CardCatalog>) -> Self {
        Self {
            catalog,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            card_limit: DECK_CARD_LIMIT,
        }
    }

    /// Bound every catalog call (lookup, search, each stream pull)
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Validate a request and resolve its card list
    ///
    /// Deterministic for a given request and catalog state.
    pub async fn validate(
        &self,
        request: &ImportRequest,
    ) -> Result<ValidatedImportJob, ValidationError> {
        request.check()?;

        let commander = self
            .bounded("commander lookup", self.catalog.lookup_commander(&request.commander_name))
            .await?
            .ok_or_else(|| ValidationError::CommanderNotFound(request.commander_name.clone()))?;

        let identity = parse_identity(commander.color_identity.as_deref().unwrap_or_default())?;

        let colors = if request.colors.is_empty() {
            identity.clone()
        } else {
            let illegal: ColorSet = request.colors.difference(&identity).copied().collect();
            if !illegal.is_empty() {
                warn!(
                    commander = %commander.name,
                    illegal = %color_symbols(&illegal),
                    "Rejecting import: colors outside commander identity"
                );
                return Err(ValidationError::IllegalColors {
                    commander: commander.name,
                    illegal: color_symbols(&illegal),
                    identity: color_symbols(&identity),
                });
            }
            request.colors.clone()
        };

        let cards = match &request.cards {
            Some(cards) => cards.clone(),
            None => self.resolve_card_pool(&colors).await?,
        };

        info!(
            requester = %request.requester,
            deck = %request.deck_name,
            commander = %commander.name,
            colors = %color_symbols(&colors),
            cards = cards.len(),
            "Import request validated"
        );

        Ok(ValidatedImportJob {
            requester: request.requester.clone(),
            deck_name: request.deck_name.clone(),
            deck_id: request.deck_id.clone(),
            commander_name: commander.name,
            commander_identity: identity,
            colors,
            cards,
        })
    }

    /// Build a card list from a color search
    ///
    /// Basic lands and cards marked repeatable may appear more than once;
    /// everything else is kept once by name. Stops pulling from the
    /// search as soon as the limit is reached, so search order decides
    /// which cards make the cut.
    async fn resolve_card_pool(&self, colors: &ColorSet) -> Result<Vec<String>, ValidationError> {
        let mut stream = self
            .bounded("card search", self.catalog.search_cards(colors))
            .await?;

        let mut cards = Vec::with_capacity(self.card_limit);
        let mut seen: HashSet<String> = HashSet::new();

        while cards.len() < self.card_limit {
            let next = tokio::time::timeout(self.upstream_timeout, stream.next())
                .await
                .map_err(|_| self.timeout_error("card search"))?;

            let card = match next {
                Some(item) => item.map_err(|e| ValidationError::upstream("card search", e))?,
                None => break,
            };

            if card.name.trim().is_empty() {
                return Err(ValidationError::UpstreamMalformed(
                    "card search returned a card without a name".to_string(),
                ));
            }

            let exempt = card.is_basic_land() || card.is_repeatable();
            if !exempt && seen.contains(&card.name) {
                debug!(card = %card.name, "Skipping duplicate card");
                continue;
            }

            seen.insert(card.name.clone());
            cards.push(card.name);
        }

        Ok(cards)
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, ValidationError>
    where
        F: Future<Output = Result<T, UpstreamError>>,
    {
        match tokio::time::timeout(self.upstream_timeout, call).await {
            Ok(result) => result.map_err(|e| ValidationError::upstream(operation, e)),
            Err(_) => Err(self.timeout_error(operation)),
        }
    }

    fn timeout_error(&self, operation: &'static str) -> ValidationError {
        let timeout_ms = self.upstream_timeout.as_millis() as u64;
        warn!(operation, timeout_ms, "Card catalog call timed out");
        ValidationError::UpstreamTimeout {
            operation,
            timeout_ms,
        }
    }
}

fn parse_identity(symbols: &[String]) -> Result<ColorSet, ValidationError> {
    symbols
        .iter()
        .map(|s| {
            s.parse::<Color>().map_err(|_| {
                ValidationError::UpstreamMalformed(format!("unknown color identity symbol {:?}", s))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardSummary, CommanderRef};
    use crate::port::card_catalog::mocks::MockCardCatalog;

    fn atraxa() -> CommanderRef {
        CommanderRef::new("Atraxa, Praetors' Voice", &["W", "U", "B", "G"])
    }

    fn wubg() -> Vec<Color> {
        vec![Color::White, Color::Blue, Color::Black, Color::Green]
    }

    fn unique_pool(n: usize) -> Vec<CardSummary> {
        (0..n)
            .map(|i| CardSummary::new(format!("Card {:03}", i), "Creature — Test"))
            .collect()
    }

    fn validator(catalog: MockCardCatalog) -> (Validator, Arc<MockCardCatalog>) {
        let catalog = Arc::new(catalog);
        (Validator::new(catalog.clone()), catalog)
    }

    #[tokio::test]
    async fn test_exact_identity_passes() {
        let (validator, _) = validator(MockCardCatalog::new().with_commander(atraxa()));
        let request = ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice")
            .with_colors(wubg())
            .with_cards(vec!["Sol Ring".to_string()]);

        let job = validator.validate(&request).await.unwrap();

        assert_eq!(job.colors, wubg().into_iter().collect::<ColorSet>());
        assert_eq!(job.commander_identity, job.colors);
        assert_eq!(job.cards, vec!["Sol Ring".to_string()]);
    }

    #[tokio::test]
    async fn test_color_outside_identity_fails() {
        let (validator, _) = validator(MockCardCatalog::new().with_commander(atraxa()));
        let mut colors = wubg();
        colors.push(Color::Red);
        let request = ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice")
            .with_colors(colors);

        let err = validator.validate(&request).await.unwrap_err();

        assert_eq!(err.kind(), ImportErrorKind::IllegalColors);
        match err {
            ValidationError::IllegalColors { illegal, .. } => assert_eq!(illegal, "R"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_every_single_outside_color_fails() {
        let commander = CommanderRef::new("Krenko, Mob Boss", &["R"]);
        let (validator, _) = validator(MockCardCatalog::new().with_commander(commander));

        for color in Color::ALL.into_iter().filter(|c| *c != Color::Red) {
            let request = ImportRequest::new("bob", "Goblins", "Krenko, Mob Boss")
                .with_colors([Color::Red, color]);
            let err = validator.validate(&request).await.unwrap_err();
            assert_eq!(err.kind(), ImportErrorKind::IllegalColors, "color {}", color);
        }
    }

    #[tokio::test]
    async fn test_commander_not_found() {
        let (validator, _) = validator(MockCardCatalog::new());
        let request = ImportRequest::new("alice", "Deck", "Nobody");

        let err = validator.validate(&request).await.unwrap_err();

        assert_eq!(err, ValidationError::CommanderNotFound("Nobody".to_string()));
    }

    #[tokio::test]
    async fn test_missing_identity_is_colorless() {
        let commander = CommanderRef {
            name: "Kozilek, the Great Distortion".to_string(),
            color_identity: None,
        };
        let (validator, catalog) = validator(
            MockCardCatalog::new()
                .with_commander(commander)
                .with_pool(unique_pool(3)),
        );

        let job = validator
            .validate(&ImportRequest::new("alice", "Eldrazi", "Kozilek, the Great Distortion"))
            .await
            .unwrap();
        assert!(job.colors.is_empty());
        assert_eq!(catalog.searched_colors(), vec![ColorSet::new()]);

        let err = validator
            .validate(
                &ImportRequest::new("alice", "Eldrazi", "Kozilek, the Great Distortion")
                    .with_colors([Color::Blue]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ImportErrorKind::IllegalColors);
    }

    #[tokio::test]
    async fn test_unknown_identity_symbol_is_malformed() {
        let commander = CommanderRef::new("Broken", &["W", "X"]);
        let (validator, _) = validator(MockCardCatalog::new().with_commander(commander));

        let err = validator
            .validate(&ImportRequest::new("alice", "Deck", "Broken"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ImportErrorKind::UpstreamMalformed);
    }

    #[tokio::test]
    async fn test_blank_request_rejected_before_lookup() {
        let (validator, catalog) = validator(MockCardCatalog::new().with_commander(atraxa()));

        let err = validator
            .validate(&ImportRequest::new("alice", "", "Atraxa, Praetors' Voice"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ImportErrorKind::InvalidRequest);
        assert_eq!(catalog.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn test_validation_is_idempotent() {
        let mut pool = unique_pool(10);
        pool.push(CardSummary::new("Card 003", "Creature — Test"));
        let (validator, _) = validator(
            MockCardCatalog::new()
                .with_commander(atraxa())
                .with_pool(pool),
        );
        let request = ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice")
            .with_colors([Color::Green, Color::White]);

        let first = validator.validate(&request).await.unwrap();
        let second = validator.validate(&request).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_card_cap_keeps_search_order() {
        let pool = unique_pool(150);
        let expected: Vec<String> = pool.iter().take(99).map(|c| c.name.clone()).collect();
        let (validator, catalog) = validator(
            MockCardCatalog::new()
                .with_commander(atraxa())
                .with_pool(pool),
        );

        let job = validator
            .validate(&ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice"))
            .await
            .unwrap();

        assert_eq!(job.cards.len(), 99);
        assert_eq!(job.cards, expected);
        // Remaining candidates are discarded without being pulled
        assert_eq!(catalog.pulled(), 99);
    }

    #[tokio::test]
    async fn test_dedup_policy() {
        const PETITIONERS_TEXT: &str =
            "A deck can have any number of cards named Persistent Petitioners.";
        let pool = vec![
            CardSummary::new("Forest", "Basic Land — Forest"),
            CardSummary::new("Sol Ring", "Artifact"),
            CardSummary::new("Forest", "Basic Land — Forest"),
            CardSummary::new("Sol Ring", "Artifact"),
            CardSummary::new("Persistent Petitioners", "Creature — Human Advisor")
                .with_oracle_text(PETITIONERS_TEXT),
            CardSummary::new("Persistent Petitioners", "Creature — Human Advisor")
                .with_oracle_text(PETITIONERS_TEXT),
        ];
        let (validator, _) = validator(
            MockCardCatalog::new()
                .with_commander(atraxa())
                .with_pool(pool),
        );

        let job = validator
            .validate(&ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice"))
            .await
            .unwrap();

        assert_eq!(
            job.cards,
            vec![
                "Forest",
                "Sol Ring",
                "Forest",
                "Persistent Petitioners",
                "Persistent Petitioners"
            ]
        );
    }

    #[tokio::test]
    async fn test_basic_lands_count_toward_cap() {
        let pool: Vec<CardSummary> = (0..120)
            .map(|_| CardSummary::new("Plains", "Basic Land — Plains"))
            .collect();
        let (validator, _) = validator(
            MockCardCatalog::new()
                .with_commander(atraxa())
                .with_pool(pool),
        );

        let job = validator
            .validate(&ImportRequest::new("alice", "Mono W", "Atraxa, Praetors' Voice"))
            .await
            .unwrap();

        assert_eq!(job.cards.len(), 99);
        assert!(job.cards.iter().all(|c| c == "Plains"));
    }

    #[tokio::test]
    async fn test_explicit_cards_used_verbatim() {
        let (validator, catalog) = validator(
            MockCardCatalog::new()
                .with_commander(atraxa())
                .with_pool(unique_pool(5)),
        );
        let cards = vec![
            "Sol Ring".to_string(),
            "Sol Ring".to_string(),
            "Doubling Season".to_string(),
        ];
        let request = ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice")
            .with_cards(cards.clone());

        let job = validator.validate(&request).await.unwrap();

        assert_eq!(job.cards, cards);
        assert!(catalog.searched_colors().is_empty());
    }

    #[tokio::test]
    async fn test_nameless_card_is_malformed() {
        let pool = vec![CardSummary::new("", "Creature")];
        let (validator, _) = validator(
            MockCardCatalog::new()
                .with_commander(atraxa())
                .with_pool(pool),
        );

        let err = validator
            .validate(&ImportRequest::new("alice", "Deck", "Atraxa, Praetors' Voice"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ImportErrorKind::UpstreamMalformed);
    }

    #[tokio::test]
    async fn test_lookup_timeout() {
        let catalog = MockCardCatalog::new()
            .with_commander(atraxa())
            .with_lookup_delay(Duration::from_millis(200));
        let validator =
            Validator::new(Arc::new(catalog)).with_upstream_timeout(Duration::from_millis(20));

        let err = validator
            .validate(&ImportRequest::new("alice", "Deck", "Atraxa, Praetors' Voice"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ImportErrorKind::UpstreamTimeout);
    }

    #[tokio::test]
    async fn test_lookup_unavailable() {
        let catalog = MockCardCatalog::new()
            .with_lookup_error(UpstreamError::Unavailable("HTTP 503".to_string()));
        let (validator, _) = validator(catalog);

        let err = validator
            .validate(&ImportRequest::new("alice", "Deck", "Atraxa"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ImportErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn test_catalog_reported_timeout_is_upstream_timeout() {
        let catalog = MockCardCatalog::new()
            .with_lookup_error(UpstreamError::Timeout { timeout_ms: 100 });
        let (validator, _) = validator(catalog);

        let err = validator
            .validate(&ImportRequest::new("alice", "Deck", "Atraxa"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::UpstreamTimeout {
                operation: "commander lookup",
                timeout_ms: 100,
            }
        );
    }
}
