use common::UnknownStatus;
use thiserror::Error;

use crate::{ReferenceId, Status};

/// Errors that can occur when interacting with the status store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored status did not match the expected one on compare-and-swap.
    #[error("Status conflict for transfer {key}: expected {expected}, found {actual}")]
    Conflict {
        key: ReferenceId,
        expected: Status,
        actual: Status,
    },

    /// The stored value is not a known status code.
    #[error("Invalid stored status for transfer {key}: {source}")]
    Decode {
        key: ReferenceId,
        #[source]
        source: UnknownStatus,
    },

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true for the distinguished compare-and-swap conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result type for status store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
