//! Priority ordering through the full submission path
//!
//! Jobs are submitted while no worker is running, then a single worker
//! drains the queue so completion order equals dequeue order.

use async_trait::async_trait;
use deckforge_core::application::{
    shutdown_channel, ImportService, PriorityQueue, Validator, WorkerPool,
};
use deckforge_core::domain::{CallerRole, CommanderRef, Deck, DeckId, ImportRequest};
use deckforge_core::port::card_catalog::mocks::MockCardCatalog;
use deckforge_core::port::id_provider::SequentialIdProvider;
use deckforge_core::port::metrics::mocks::RecordingMetrics;
use deckforge_core::port::notifier::mocks::RecordingNotifier;
use deckforge_core::port::time_provider::FixedTimeProvider;
use deckforge_core::port::{DeckRepository, ImportQueue, PersistenceError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Remembers the order in which decks were written
#[derive(Default)]
struct OrderRecordingRepository {
    written: Mutex<Vec<String>>,
}

impl OrderRecordingRepository {
    fn order(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeckRepository for OrderRecordingRepository {
    async fn save(&self, deck: &Deck) -> Result<DeckId, PersistenceError> {
        let mut written = self.written.lock().unwrap();
        written.push(deck.name.clone());
        Ok(format!("deck-{}", written.len()))
    }

    async fn update(&self, id: &DeckId, _deck: &Deck) -> Result<(), PersistenceError> {
        Err(PersistenceError::NotFound(id.clone()))
    }

    async fn find_by_id(&self, _id: &DeckId) -> Result<Option<Deck>, PersistenceError> {
        Ok(None)
    }
}

struct Setup {
    service: ImportService,
    queue: Arc<PriorityQueue>,
    repo: Arc<OrderRecordingRepository>,
}

fn setup() -> Setup {
    let catalog = MockCardCatalog::new()
        .with_commander(CommanderRef::new("Atraxa, Praetors' Voice", &["W", "U", "B", "G"]));
    let queue = Arc::new(PriorityQueue::new());
    let service = ImportService::new(
        Validator::new(Arc::new(catalog)),
        queue.clone(),
        Arc::new(RecordingNotifier::new()),
        Arc::new(RecordingMetrics::new()),
        Arc::new(SequentialIdProvider::default()),
        Arc::new(FixedTimeProvider(0)),
    );
    Setup {
        service,
        queue,
        repo: Arc::new(OrderRecordingRepository::default()),
    }
}

fn request(deck: &str) -> ImportRequest {
    ImportRequest::new("player", deck, "Atraxa, Praetors' Voice")
        .with_cards(vec!["Sol Ring".to_string()])
}

async fn drain_with_one_worker(setup: &Setup) {
    setup.queue.close();
    let pool = WorkerPool::new(
        1,
        setup.queue.clone(),
        setup.repo.clone(),
        Arc::new(RecordingNotifier::new()),
        Arc::new(RecordingMetrics::new()),
    );
    let (_shutdown_tx, token) = shutdown_channel();
    let mut handle = pool.spawn(token);
    tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .expect("worker should drain the closed queue");
}

#[tokio::test]
async fn test_high_low_high_completes_a_c_b() {
    let setup = setup();
    setup
        .service
        .submit(request("A"), CallerRole::Elevated)
        .await
        .unwrap();
    setup
        .service
        .submit(request("B"), CallerRole::Standard)
        .await
        .unwrap();
    setup
        .service
        .submit(request("C"), CallerRole::Elevated)
        .await
        .unwrap();

    drain_with_one_worker(&setup).await;

    assert_eq!(setup.repo.order(), vec!["A", "C", "B"]);
}

#[tokio::test]
async fn test_interleaved_classes_keep_fifo_within_class() {
    let setup = setup();
    let roles = [
        CallerRole::Standard,
        CallerRole::Elevated,
        CallerRole::Standard,
        CallerRole::Elevated,
        CallerRole::Standard,
        CallerRole::Elevated,
    ];
    for (i, role) in roles.iter().enumerate() {
        let name = match role {
            CallerRole::Elevated => format!("high-{}", i),
            CallerRole::Standard => format!("low-{}", i),
        };
        setup.service.submit(request(&name), *role).await.unwrap();
    }
    assert_eq!(setup.queue.depth().total(), 6);

    drain_with_one_worker(&setup).await;

    assert_eq!(
        setup.repo.order(),
        vec!["high-1", "high-3", "high-5", "low-0", "low-2", "low-4"]
    );
}
