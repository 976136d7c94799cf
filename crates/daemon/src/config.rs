//! Daemon configuration from `DECKFORGE_*` environment variables

use deckforge_core::application::PipelineConfig;
use deckforge_infra_scryfall::DEFAULT_SCRYFALL_URL;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "~/.deckforge/decks.db";
const DEFAULT_RPC_PORT: u16 = deckforge_api_rpc::server::DEFAULT_RPC_PORT;
const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 10_000;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: String,
    pub rpc_port: u16,
    pub scryfall_url: String,
    pub log_format: LogFormat,
    pub shutdown_grace: Duration,
    pub pipeline: PipelineConfig,
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let defaults = PipelineConfig::default();

        let db_path = lookup("DECKFORGE_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        Self {
            db_path: shellexpand::tilde(&db_path).into_owned(),
            rpc_port: lookup("DECKFORGE_RPC_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RPC_PORT),
            scryfall_url: lookup("DECKFORGE_SCRYFALL_URL")
                .unwrap_or_else(|| DEFAULT_SCRYFALL_URL.to_string()),
            log_format: lookup("DECKFORGE_LOG_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(LogFormat::Pretty),
            shutdown_grace: Duration::from_millis(
                parse("DECKFORGE_SHUTDOWN_GRACE_MS").unwrap_or(DEFAULT_SHUTDOWN_GRACE_MS),
            ),
            pipeline: PipelineConfig {
                workers: parse("DECKFORGE_WORKERS")
                    .map(|n| n as usize)
                    .filter(|n| *n > 0)
                    .unwrap_or(defaults.workers),
                // 0 means unbounded
                queue_capacity: parse("DECKFORGE_QUEUE_CAPACITY")
                    .map(|n| n as usize)
                    .filter(|n| *n > 0),
                upstream_timeout: parse("DECKFORGE_UPSTREAM_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.upstream_timeout),
                persist_timeout: parse("DECKFORGE_PERSIST_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.persist_timeout),
                notify_timeout: parse("DECKFORGE_NOTIFY_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.notify_timeout),
            },
        }
    }

    /// sqlx connection URL for the deck database
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            self.db_path.clone()
        } else {
            format!("sqlite://{}", self.db_path)
        }
    }
}
