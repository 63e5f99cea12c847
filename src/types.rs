//! Shared error types

use thiserror::Error;

/// Errors surfaced by the kennel service
#[derive(Debug, Error)]
pub enum KennelError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KennelError>;
