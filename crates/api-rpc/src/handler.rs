//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::{invalid_params, to_rpc_error};
use crate::types::{ImportDeckRequest, ImportDeckResponse, StatsResponse};
use deckforge_core::application::ImportService;
use deckforge_core::port::{ImportQueue, MetricsRecorder};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<ImportService>,
    queue: Arc<dyn ImportQueue>,
    metrics: Arc<dyn MetricsRecorder>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(
        service: Arc<ImportService>,
        queue: Arc<dyn ImportQueue>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            service,
            queue,
            metrics,
            start_time: std::time::Instant::now(),
        }
    }

    /// deck.import.v1
    pub async fn import_deck(
        &self,
        params: ImportDeckRequest,
    ) -> Result<ImportDeckResponse, ErrorObjectOwned> {
        let (request, role) = params.into_parts().map_err(invalid_params)?;
        debug!(requester = %request.requester, role = ?role, "deck.import.v1");

        let ack = self
            .service
            .submit(request, role)
            .await
            .map_err(to_rpc_error)?;

        Ok(ImportDeckResponse {
            job_id: ack.job_id,
            priority: ack.priority.to_string(),
            sequence: ack.sequence,
            state: ack.state,
        })
    }

    /// admin.stats.v1
    pub async fn stats(&self) -> Result<StatsResponse, ErrorObjectOwned> {
        let depth = self.queue.depth();

        Ok(StatsResponse {
            queued_high: depth.high,
            queued_low: depth.low,
            queued_total: depth.total(),
            counters: self.metrics.snapshot(),
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }
}
