//! Transfer error types.

use banking::BankingError;
use common::{ReferenceId, Status};
use status_store::StoreError;
use task_queue::QueueError;
use thiserror::Error;

/// Errors returned by the transfer handlers.
///
/// Business outcomes never show up here: they travel through the saga as
/// data. Every variant that reaches the dispatch wrapper leads to a delayed
/// redelivery of the task.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Status store error.
    #[error("Status store error: {0}")]
    Store(#[from] StoreError),

    /// Task queue error.
    #[error("Task queue error: {0}")]
    Queue(#[from] QueueError),

    /// Transient banking error.
    #[error("Banking error: {0}")]
    Bank(#[from] BankingError),

    /// The event expects a status whose write is not visible yet.
    #[error(
        "Event for transfer {reference_id} expects status {last_status}, store has {stored}"
    )]
    PrematureEvent {
        reference_id: ReferenceId,
        stored: Status,
        last_status: Status,
    },

    /// The handler was cancelled before finishing.
    #[error("Operation cancelled")]
    Cancelled,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A transfer request failed validation.
    #[error("Invalid transfer request: {0}")]
    InvalidRequest(String),
}

/// Convenience type alias for transfer results.
pub type Result<T> = std::result::Result<T, TransferError>;
