use chrono::{DateTime, Utc};

/// A task pulled off a persistent queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Queue-assigned identity, stable across redeliveries.
    pub id: u64,
    /// The queue the task was enqueued on.
    pub queue_name: String,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Number of previous delivery attempts; 0 on first delivery.
    pub attempt: u32,
    /// When the task was first enqueued.
    pub enqueued_at: DateTime<Utc>,
}

impl Task {
    /// Creates a first-attempt task.
    pub fn new(id: u64, queue_name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id,
            queue_name: queue_name.into(),
            payload,
            attempt: 0,
            enqueued_at: Utc::now(),
        }
    }

    /// Returns the same task with its attempt counter incremented.
    pub fn next_attempt(mut self) -> Self {
        self.attempt = self.attempt.saturating_add(1);
        self
    }
}
