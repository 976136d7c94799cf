//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use deckforge_core::domain::{DomainError, ImportErrorKind};
use deckforge_core::error::AppError;
use deckforge_core::port::QueueError;
use jsonrpsee::types::ErrorObjectOwned;
use serde_json::json;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const THROTTLED: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const UPSTREAM_ERROR: i32 = 5003;
    pub const UNAVAILABLE: i32 = 5004;
}

fn code_for(err: &AppError) -> i32 {
    match err {
        AppError::Queue(QueueError::Full { .. }) => code::THROTTLED,
        AppError::Queue(QueueError::Closed) => code::UNAVAILABLE,
        _ => match err.kind() {
            ImportErrorKind::InvalidRequest | ImportErrorKind::IllegalColors => {
                code::VALIDATION_ERROR
            }
            ImportErrorKind::CommanderNotFound | ImportErrorKind::DeckNotFound => {
                code::NOT_FOUND
            }
            ImportErrorKind::UpstreamTimeout
            | ImportErrorKind::UpstreamMalformed
            | ImportErrorKind::UpstreamUnavailable => code::UPSTREAM_ERROR,
            ImportErrorKind::PersistenceError | ImportErrorKind::Internal => {
                code::INTERNAL_ERROR
            }
        },
    }
}

/// Convert AppError to JSON-RPC ErrorObject; `data.kind` carries the failure kind
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let kind = err.kind();
    ErrorObjectOwned::owned(
        code_for(&err),
        err.to_string(),
        Some(json!({ "kind": kind })),
    )
}

/// Request parameters that fail domain parsing
pub fn invalid_params(err: DomainError) -> ErrorObjectOwned {
    to_rpc_error(AppError::Domain(err))
}
