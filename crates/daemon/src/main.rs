//! Deckforge - Main Entry Point
//! JSON-RPC submission API + import worker pool

mod config;
mod telemetry;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

// Import workspace crates
use deckforge_api_rpc::{RpcServer, RpcServerConfig};
use deckforge_core::application::{ImportPipeline, PipelinePorts};
use deckforge_core::port::id_provider::UuidProvider;
use deckforge_core::port::time_provider::SystemTimeProvider;
use deckforge_infra_local::{BroadcastNotifier, InMemoryMetrics};
use deckforge_infra_scryfall::{ScryfallCatalog, ScryfallConfig};
use deckforge_infra_sqlite::{create_pool, run_migrations, SqliteDeckRepository};

use config::DaemonConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env();

    // 2. Initialize logging
    telemetry::init_tracing(config.log_format)?;
    info!("Deckforge v{} starting...", VERSION);

    // 3. Initialize database
    info!(db_path = %config.db_path, "Initializing database...");
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        if !config.db_path.starts_with("sqlite:") && !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let pool = create_pool(&config.database_url())
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let deck_repo = Arc::new(SqliteDeckRepository::new(pool.clone(), time_provider.clone()));
    let catalog = Arc::new(
        ScryfallCatalog::new(ScryfallConfig {
            base_url: config.scryfall_url.clone(),
            request_timeout: config.pipeline.upstream_timeout,
            ..ScryfallConfig::default()
        })
        .map_err(|e| anyhow::anyhow!("Card catalog setup failed: {}", e))?,
    );
    let notifier = Arc::new(BroadcastNotifier::default());
    let metrics = Arc::new(InMemoryMetrics::new());

    // 5. Log every import status event
    let mut events = notifier.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(
                    job_id = %event.job_id,
                    requester = %event.requester,
                    status = event.status.as_label(),
                    deck_id = ?event.deck_id,
                    error_kind = ?event.error_kind,
                    summary = %event.summary,
                    "Import status"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Import status logger lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 6. Start the import pipeline
    let pipeline = ImportPipeline::start(
        config.pipeline.clone(),
        PipelinePorts {
            catalog,
            deck_repo,
            notifier,
            metrics,
            id_provider: Arc::new(UuidProvider),
            time_provider,
        },
    );

    // 7. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        port: config.rpc_port,
        ..Default::default()
    };
    let rpc_server = RpcServer::new(
        rpc_config,
        pipeline.service(),
        pipeline.queue(),
        pipeline.metrics(),
    );
    let (rpc_handle, rpc_addr) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(rpc = %rpc_addr, "System ready. Waiting for imports...");
    info!("Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown: stop intake, then drain
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pipeline.shutdown(config.shutdown_grace).await;
    event_logger.abort();
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}
