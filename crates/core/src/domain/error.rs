// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid import request: {0}")]
    InvalidRequest(String),

    #[error("Unknown color symbol: {0}")]
    UnknownColor(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
