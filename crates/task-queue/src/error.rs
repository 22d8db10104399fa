use thiserror::Error;

/// Errors that can occur when interacting with the task queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue has been shut down and accepts no more tasks.
    #[error("Queue is closed")]
    Closed,

    /// The queue backend could not be reached.
    #[error("Queue unavailable: {0}")]
    Unavailable(String),
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
