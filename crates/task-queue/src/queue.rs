use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::{Result, Task};

/// Callback invoked once per delivered task.
///
/// The token is cancelled when the queue shuts down; consumers should stop
/// promptly and leave the task unacknowledged or scheduled for retry.
pub type Consumer = Arc<dyn Fn(CancellationToken, Task) -> BoxFuture<'static, ()> + Send + Sync>;

/// A persistent task queue.
///
/// All implementations must be thread-safe (Send + Sync) and must durably
/// persist a task before `enqueue` returns.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Appends a task with the given payload to `queue`.
    async fn enqueue(&self, queue: &str, payload: Vec<u8>) -> Result<()>;

    /// Registers the consumer for `queue`.
    ///
    /// The consumer may be invoked concurrently, any number of times, including
    /// for multiple deliveries of the same task.
    fn consume(&self, queue: &str, consumer: Consumer);

    /// Permanently removes a delivered task.
    async fn ack(&self, task: &Task);

    /// Schedules redelivery of a task after `delay`, with its attempt
    /// counter incremented.
    async fn retry_later(&self, task: Task, delay: Duration);
}
