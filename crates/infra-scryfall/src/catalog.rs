// Scryfall CardCatalog Implementation

use crate::model::{ScryfallCard, SearchPage};
use async_trait::async_trait;
use deckforge_core::domain::{color_symbols, CardSummary, ColorSet, CommanderRef};
use deckforge_core::port::{CardCatalog, CardStream, UpstreamError};
use futures::stream;
use reqwest::{StatusCode, Url};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_SCRYFALL_URL: &str = "https://api.scryfall.com";

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct ScryfallConfig {
    pub base_url: String,
    /// Per-request limit, independent of the validator's bound
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ScryfallConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SCRYFALL_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("deckforge/{}", deckforge_core::VERSION),
        }
    }
}

pub struct ScryfallCatalog {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl ScryfallCatalog {
    pub fn new(config: ScryfallConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| UpstreamError::Unavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, UpstreamError> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| UpstreamError::Unavailable(format!("Invalid catalog URL: {}", e)))
    }
}

/// `color=` search term; colorless decks search for colorless cards
fn color_query(colors: &ColorSet) -> String {
    if colors.is_empty() {
        "color=C".to_string()
    } else {
        format!("color={}", color_symbols(colors))
    }
}

fn transport_error(err: reqwest::Error, limit: Duration) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout {
            timeout_ms: limit.as_millis() as u64,
        }
    } else {
        UpstreamError::Unavailable(err.to_string())
    }
}

/// GET a JSON document; `Ok(None)` on 404
async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
    limit: Duration,
) -> Result<Option<T>, UpstreamError> {
    debug!(url = %url, "Card catalog request");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(e, limit))?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        warn!(status = status.as_u16(), "Card catalog returned error status");
        return Err(UpstreamError::Unavailable(format!(
            "card catalog returned HTTP {}",
            status.as_u16()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(e, limit))?;
    serde_json::from_slice(&body)
        .map(Some)
        .map_err(|e| UpstreamError::Malformed(e.to_string()))
}

/// Pagination cursor driving the lazy search stream
struct SearchCursor {
    client: reqwest::Client,
    request_timeout: Duration,
    buffered: VecDeque<CardSummary>,
    next_page: Option<Url>,
}

impl SearchCursor {
    fn load(&mut self, page: Option<SearchPage>) -> Result<(), UpstreamError> {
        let Some(page) = page else {
            self.next_page = None;
            return Ok(());
        };

        self.next_page = match page.next() {
            Some(next) => Some(
                Url::parse(&next)
                    .map_err(|e| UpstreamError::Malformed(format!("bad next_page: {}", e)))?,
            ),
            None => None,
        };
        self.buffered
            .extend(page.data.into_iter().map(ScryfallCard::into_summary));
        Ok(())
    }

    fn into_stream(self) -> CardStream {
        Box::pin(stream::unfold(self, |mut cursor| async move {
            loop {
                if let Some(card) = cursor.buffered.pop_front() {
                    return Some((Ok(card), cursor));
                }

                // Exhausted, or a previous page failed
                let url = cursor.next_page.take()?;
                let page =
                    get_json::<SearchPage>(&cursor.client, url, cursor.request_timeout).await;
                if let Err(e) = page.and_then(|page| cursor.load(page)) {
                    return Some((Err(e), cursor));
                }
            }
        }))
    }
}

#[async_trait]
impl CardCatalog for ScryfallCatalog {
    async fn lookup_commander(&self, name: &str) -> Result<Option<CommanderRef>, UpstreamError> {
        let url = self.endpoint("/cards/named", &[("exact", name)])?;
        let card = get_json::<ScryfallCard>(&self.client, url, self.request_timeout).await?;

        Ok(card.map(ScryfallCard::into_commander))
    }

    async fn search_cards(&self, colors: &ColorSet) -> Result<CardStream, UpstreamError> {
        let query = color_query(colors);
        let url = self.endpoint(
            "/cards/search",
            &[("q", query.as_str()), ("unique", "cards"), ("order", "name")],
        )?;

        // First page is fetched eagerly so a dead catalog fails the call itself
        let first = get_json::<SearchPage>(&self.client, url, self.request_timeout).await?;
        let mut cursor = SearchCursor {
            client: self.client.clone(),
            request_timeout: self.request_timeout,
            buffered: VecDeque::new(),
            next_page: None,
        };
        cursor.load(first)?;

        debug!(
            query = %query,
            first_page = cursor.buffered.len(),
            more = cursor.next_page.is_some(),
            "Card search opened"
        );
        Ok(cursor.into_stream())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckforge_core::domain::Color;
    use futures::StreamExt;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog(server: &MockServer) -> ScryfallCatalog {
        ScryfallCatalog::new(ScryfallConfig {
            base_url: server.uri(),
            request_timeout: Duration::from_secs(2),
            ..ScryfallConfig::default()
        })
        .unwrap()
    }

    fn card(name: &str) -> serde_json::Value {
        json!({ "name": name, "type_line": "Creature — Goblin" })
    }

    #[tokio::test]
    async fn test_lookup_commander_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/named"))
            .and(query_param("exact", "Atraxa, Praetors' Voice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "card",
                "name": "Atraxa, Praetors' Voice",
                "type_line": "Legendary Creature — Phyrexian Angel Horror",
                "color_identity": ["B", "G", "U", "W"],
                "colors": ["B", "G", "U", "W"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let commander = catalog(&server)
            .lookup_commander("Atraxa, Praetors' Voice")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(commander.name, "Atraxa, Praetors' Voice");
        assert_eq!(commander.color_identity.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_lookup_commander_not_found() {
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

        let result = catalog(&server).lookup_commander("Nobody").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = catalog(&server).lookup_commander("Anyone").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/named"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = catalog(&server).lookup_commander("Anyone").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_slow_catalog_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let catalog = ScryfallCatalog::new(ScryfallConfig {
            base_url: server.uri(),
            request_timeout: Duration::from_millis(100),
            ..ScryfallConfig::default()
        })
        .unwrap();

        let err = catalog.lookup_commander("Anyone").await.unwrap_err();
        assert_eq!(err, UpstreamError::Timeout { timeout_ms: 100 });
    }

    #[tokio::test]
    async fn test_search_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/search"))
            .and(query_param("q", "color=UR"))
            .and(query_param("order", "name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "has_more": true,
                "next_page": format!("{}/cards/search?page=2", server.uri()),
                "data": [card("Alpha"), card("Bravo")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cards/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "has_more": false,
                "data": [card("Charlie")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let colors: ColorSet = [Color::Blue, Color::Red].into_iter().collect();
        let stream = catalog(&server).search_cards(&colors).await.unwrap();
        let names: Vec<String> = stream.map(|card| card.unwrap().name).collect().await;

        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
    }

    #[tokio::test]
    async fn test_search_is_lazy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/search"))
            .and(query_param("q", "color=G"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "has_more": true,
                "next_page": format!("{}/cards/search?page=2", server.uri()),
                "data": [card("Llanowar Elves"), card("Elvish Mystic")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cards/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "has_more": false,
                "data": []
            })))
            .expect(0)
            .mount(&server)
            .await;

        let colors: ColorSet = [Color::Green].into_iter().collect();
        let stream = catalog(&server).search_cards(&colors).await.unwrap();
        let first: Vec<_> = stream.take(2).collect().await;

        assert_eq!(first.len(), 2);
        // page 2 expectation is verified when the server drops
    }

    #[tokio::test]
    async fn test_search_without_matches_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/search"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "object": "error",
                "code": "not_found",
                "details": "Your query didn't match any cards."
            })))
            .mount(&server)
            .await;

        let stream = catalog(&server).search_cards(&ColorSet::new()).await.unwrap();
        let cards: Vec<_> = stream.collect().await;
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn test_failed_later_page_ends_stream_with_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/search"))
            .and(query_param("q", "color=B"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "has_more": true,
                "next_page": format!("{}/cards/search?page=2", server.uri()),
                "data": [card("Dark Ritual")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cards/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let colors: ColorSet = [Color::Black].into_iter().collect();
        let stream = catalog(&server).search_cards(&colors).await.unwrap();
        let items: Vec<_> = stream.collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(UpstreamError::Unavailable(_))));
    }

    #[test]
    fn test_color_query() {
        let colors: ColorSet = [Color::Green, Color::White].into_iter().collect();
        assert_eq!(color_query(&colors), "color=WG");
        assert_eq!(color_query(&ColorSet::new()), "color=C");
    }
}
