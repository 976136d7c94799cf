// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(#[from] crate::application::validator::ValidationError),

    #[error("Queue error: {0}")]
    Queue(#[from] crate::port::QueueError),
}

impl AppError {
    /// Failure kind reported to callers and observers
    pub fn kind(&self) -> crate::domain::ImportErrorKind {
        use crate::domain::ImportErrorKind;

        match self {
            AppError::Validation(e) => e.kind(),
            AppError::Domain(_) => ImportErrorKind::InvalidRequest,
            AppError::Queue(_) => ImportErrorKind::Internal,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
