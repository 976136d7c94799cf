// SQLite DeckRepository Implementation

use async_trait::async_trait;
use deckforge_core::domain::{Color, Deck, DeckId};
use deckforge_core::port::{DeckRepository, PersistenceError, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

/// Every sqlx failure is `Unavailable`; the SQLite result code stays in the message
fn map_sqlx_error(err: sqlx::Error) -> PersistenceError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => PersistenceError::Unavailable(format!(
                "Database error [{}]: {}",
                code,
                db_err.message()
            )),
            None => {
                PersistenceError::Unavailable(format!("Database error: {}", db_err.message()))
            }
        },
        _ => PersistenceError::Unavailable(err.to_string()),
    }
}

fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, PersistenceError> {
    serde_json::to_string(value)
        .map_err(|e| PersistenceError::Unavailable(format!("Failed to encode column: {}", e)))
}

pub struct SqliteDeckRepository {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteDeckRepository {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// Number of stored decks
    pub async fn count(&self) -> Result<i64, PersistenceError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM decks")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl DeckRepository for SqliteDeckRepository {
    async fn save(&self, deck: &Deck) -> Result<DeckId, PersistenceError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = self.time_provider.now_millis();

        sqlx::query(
            r#"
            INSERT INTO decks (
                id, owner, name, commander_name, colors, cards, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&deck.owner)
        .bind(&deck.name)
        .bind(&deck.commander_name)
        .bind(encode_json(&deck.colors)?)
        .bind(encode_json(&deck.cards)?)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(deck_id = %id, cards = deck.cards.len(), "Deck inserted");
        Ok(id)
    }

    async fn update(&self, id: &DeckId, deck: &Deck) -> Result<(), PersistenceError> {
        // Single statement: concurrent updates of one id serialize in SQLite
        let result = sqlx::query(
            r#"
            UPDATE decks
            SET owner = ?, name = ?, commander_name = ?, colors = ?, cards = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&deck.owner)
        .bind(&deck.name)
        .bind(&deck.commander_name)
        .bind(encode_json(&deck.colors)?)
        .bind(encode_json(&deck.cards)?)
        .bind(self.time_provider.now_millis())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id.clone()));
        }

        debug!(deck_id = %id, cards = deck.cards.len(), "Deck updated");
        Ok(())
    }

    async fn find_by_id(&self, id: &DeckId) -> Result<Option<Deck>, PersistenceError> {
        let row = sqlx::query_as::<_, DeckRow>(
            "SELECT id, owner, name, commander_name, colors, cards FROM decks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(DeckRow::into_deck).transpose()
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct DeckRow {
    id: String,
    owner: String,
    name: String,
    commander_name: String,
    colors: String,
    cards: String,
}

impl DeckRow {
    fn into_deck(self) -> Result<Deck, PersistenceError> {
        let colors: Vec<Color> = serde_json::from_str(&self.colors).map_err(|e| {
            PersistenceError::Unavailable(format!("Corrupt colors for deck {}: {}", self.id, e))
        })?;
        let cards: Vec<String> = serde_json::from_str(&self.cards).map_err(|e| {
            PersistenceError::Unavailable(format!("Corrupt cards for deck {}: {}", self.id, e))
        })?;

        Ok(Deck {
            name: self.name,
            owner: self.owner,
            commander_name: self.commander_name,
            colors,
            cards,
        })
    }
}
