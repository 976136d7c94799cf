//! Validation against a Scryfall-shaped HTTP catalog

use deckforge_core::application::{ImportPipeline, PipelineConfig, PipelinePorts};
use deckforge_core::domain::{CallerRole, Color, ImportErrorKind, ImportRequest};
use deckforge_core::port::deck_repository::mocks::MockDeckRepository;
use deckforge_core::port::id_provider::SequentialIdProvider;
use deckforge_core::port::metrics::mocks::RecordingMetrics;
use deckforge_core::port::metrics::REJECTED_TOTAL;
use deckforge_core::port::notifier::mocks::RecordingNotifier;
use deckforge_core::port::time_provider::FixedTimeProvider;
use deckforge_core::port::ImportStatus;
use deckforge_infra_scryfall::{ScryfallCatalog, ScryfallConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Stack {
    pipeline: ImportPipeline,
    repo: Arc<MockDeckRepository>,
    notifier: Arc<RecordingNotifier>,
    metrics: Arc<RecordingMetrics>,
}

async fn mount_atraxa(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cards/named"))
        .and(query_param("exact", "Atraxa, Praetors' Voice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "card",
            "name": "Atraxa, Praetors' Voice",
            "type_line": "Legendary Creature — Phyrexian Angel Horror",
            "color_identity": ["B", "G", "U", "W"]
        })))
        .mount(server)
        .await;
}

fn stack(server: &MockServer, upstream_timeout: Duration) -> Stack {
    let catalog = ScryfallCatalog::new(ScryfallConfig {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        ..ScryfallConfig::default()
    })
    .unwrap();
    let repo = Arc::new(MockDeckRepository::new_success());
    let notifier = Arc::new(RecordingNotifier::new());
    let metrics = Arc::new(RecordingMetrics::new());

    let pipeline = ImportPipeline::start(
        PipelineConfig {
            workers: 1,
            upstream_timeout,
            ..PipelineConfig::default()
        },
        PipelinePorts {
            catalog: Arc::new(catalog),
            deck_repo: repo.clone(),
            notifier: notifier.clone(),
            metrics: metrics.clone(),
            id_provider: Arc::new(SequentialIdProvider::default()),
            time_provider: Arc::new(FixedTimeProvider(0)),
        },
    );

    Stack {
        pipeline,
        repo,
        notifier,
        metrics,
    }
}

fn wubg() -> [Color; 4] {
    [Color::White, Color::Blue, Color::Black, Color::Green]
}

#[tokio::test]
async fn test_extra_color_rejected_before_queue() {
    let server = MockServer::start().await;
    mount_atraxa(&server).await;
    let stack = stack(&server, Duration::from_secs(5));

    let mut colors = wubg().to_vec();
    colors.push(Color::Red);
    let err = stack
        .pipeline
        .service()
        .submit(
            ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice")
                .with_colors(colors),
            CallerRole::Elevated,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::IllegalColors);
    assert_eq!(stack.pipeline.depth().total(), 0);
    assert_eq!(
        stack
            .metrics
            .count(REJECTED_TOTAL, &[("reason", "illegal_colors")]),
        1
    );
    stack.pipeline.shutdown(Duration::from_secs(1)).await;
    assert_eq!(stack.repo.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_commander_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/named"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error",
            "code": "not_found",
            "status": 404
        })))
        .mount(&server)
        .await;
    let stack = stack(&server, Duration::from_secs(5));

    let err = stack
        .pipeline
        .service()
        .submit(
            ImportRequest::new("alice", "Nope", "Definitely Not A Card"),
            CallerRole::Standard,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::CommanderNotFound);
    stack.pipeline.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_slow_catalog_times_out_synchronously() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/named"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "name": "Atraxa, Praetors' Voice" })),
        )
        .mount(&server)
        .await;
    let stack = stack(&server, Duration::from_millis(100));

    let err = stack
        .pipeline
        .service()
        .submit(
            ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice"),
            CallerRole::Standard,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::UpstreamTimeout);
    stack.pipeline.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_search_built_deck_is_stored() {
    let server = MockServer::start().await;
    mount_atraxa(&server).await;
    Mock::given(method("GET"))
        .and(path("/cards/search"))
        .and(query_param("q", "color=WUBG"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "has_more": true,
            "next_page": format!("{}/cards/search?page=2", server.uri()),
            "data": [
                { "name": "Plains", "type_line": "Basic Land — Plains" },
                { "name": "Plains", "type_line": "Basic Land — Plains" },
                { "name": "Doubling Season", "type_line": "Enchantment" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cards/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "has_more": false,
            "data": [
                { "name": "Doubling Season", "type_line": "Enchantment" },
                {
                    "name": "Persistent Petitioners",
                    "type_line": "Creature — Human Advisor",
                    "oracle_text": "A deck can have any number of cards named Persistent Petitioners."
                },
                {
                    "name": "Persistent Petitioners",
                    "type_line": "Creature — Human Advisor",
                    "oracle_text": "A deck can have any number of cards named Persistent Petitioners."
                }
            ]
        })))
        .mount(&server)
        .await;
    let stack = stack(&server, Duration::from_secs(5));

    stack
        .pipeline
        .service()
        .submit(
            ImportRequest::new("alice", "Superfriends", "Atraxa, Praetors' Voice")
                .with_colors(wubg()),
            CallerRole::Standard,
        )
        .await
        .unwrap();
    stack.pipeline.shutdown(Duration::from_secs(5)).await;

    let completed = stack.notifier.with_status(ImportStatus::Completed);
    assert_eq!(completed.len(), 1);
    let deck = stack
        .repo
        .get(completed[0].deck_id.as_deref().unwrap())
        .unwrap();
    assert_eq!(
        deck.cards,
        vec![
            "Plains",
            "Plains",
            "Doubling Season",
            "Persistent Petitioners",
            "Persistent Petitioners"
        ]
    );
}
