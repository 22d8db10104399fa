//! Uniform ack / retry / dead-letter handling around task handlers.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use task_queue::{CancellationToken, Consumer, Queue, Task};

use crate::backoff;
use crate::error::Result;
use crate::topics;

/// Wraps a handler into a queue consumer.
///
/// On success the task is acknowledged. On failure it is redelivered after
/// [`backoff::delay_for`] its attempt count. Handlers that want a task gone
/// for good dead-letter it themselves and return `Ok`.
pub fn handle_errors<Q, F, Fut>(queue: Q, handler: F) -> Consumer
where
    Q: Queue + Clone + 'static,
    F: Fn(CancellationToken, Task) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |token: CancellationToken, task: Task| {
        let queue = queue.clone();
        let outcome = handler(token, task.clone());
        async move {
            match outcome.await {
                Ok(()) => queue.ack(&task).await,
                Err(err) => {
                    let delay = backoff::delay_for(task.attempt);
                    metrics::counter!(
                        "transfer_task_retries_total",
                        "queue" => task.queue_name.clone()
                    )
                    .increment(1);
                    tracing::warn!(
                        task_id = task.id,
                        queue = %task.queue_name,
                        attempt = task.attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "failed to process task, retrying later"
                    );
                    queue.retry_later(task, delay).await;
                }
            }
        }
        .boxed()
    })
}

/// Parks the original payload on `<queue>-DLQ` for manual inspection.
pub async fn move_to_dead_letter_queue<Q>(queue: &Q, task: &Task) -> Result<()>
where
    Q: Queue + ?Sized,
{
    let dead_letter_queue = topics::dead_letter_queue(&task.queue_name);
    queue
        .enqueue(&dead_letter_queue, task.payload.clone())
        .await?;

    metrics::counter!("transfer_dead_letters_total", "queue" => task.queue_name.clone())
        .increment(1);
    tracing::warn!(
        task_id = task.id,
        queue = %task.queue_name,
        %dead_letter_queue,
        "task moved to dead-letter queue"
    );
    Ok(())
}
