//! Error types for the entry store and service

use thiserror::Error;

/// Failures raised by an `EntryStore` backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Failures raised by `EntryService`
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Write conflict: collection changed {attempts} times during update")]
    Conflict { attempts: usize },

    #[error("Unauthorized: admin access required")]
    Unauthorized,
}

impl ServiceError {
    /// Whether the caller could succeed by presenting credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Unauthorized)
    }
}
