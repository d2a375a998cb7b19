//! Store-level errors

use checkmarket::{DecodeError, DomainError};
use thiserror::Error;

/// Read, write or subscription failure against the document store
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("document encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type StoreResult<T> = Result<T, UpstreamError>;

impl UpstreamError {
    pub fn not_found(id: &str) -> Self {
        UpstreamError::Domain(DomainError::NotFound(format!("Item {} not found", id)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::Domain(DomainError::NotFound(_)))
    }
}
