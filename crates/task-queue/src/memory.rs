use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{Consumer, Queue, QueueError, Result, Task};

#[derive(Default)]
struct QueueState {
    next_id: u64,
    /// Tasks waiting for a consumer (or for a manual `take`).
    ready: HashMap<String, VecDeque<Task>>,
    consumers: HashMap<String, Consumer>,
    /// Whether `history`, `acked` and `retries` are kept.
    record_history: bool,
    /// Every payload ever enqueued, per queue.
    history: HashMap<String, Vec<Vec<u8>>>,
    in_flight: HashMap<u64, Task>,
    acked: Vec<Task>,
    retries: Vec<(Task, Duration)>,
    fail_enqueues: usize,
}

/// In-memory at-least-once task queue.
///
/// Once a consumer is registered for a queue, every delivery runs on its own
/// Tokio task, so deliveries are concurrent and unordered. Without a consumer,
/// tasks wait until one is registered or until a test pulls them with
/// [`InMemoryQueue::take`].
///
/// Settled tasks are dropped. Queues built with [`InMemoryQueue::with_history`]
/// also keep every payload, acknowledgement and retry for inspection.
///
/// Must be used from within a Tokio runtime.
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    state: Arc<Mutex<QueueState>>,
    shutdown: CancellationToken,
}

impl InMemoryQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty queue that records its history for inspection.
    pub fn with_history() -> Self {
        let queue = Self::default();
        queue.lock().record_history = true;
        queue
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands a task to the registered consumer, or parks it in the ready list.
    fn deliver(&self, task: Task) {
        let consumer = {
            let mut state = self.lock();
            match state.consumers.get(&task.queue_name).cloned() {
                Some(consumer) => {
                    state.in_flight.insert(task.id, task.clone());
                    consumer
                }
                None => {
                    state
                        .ready
                        .entry(task.queue_name.clone())
                        .or_default()
                        .push_back(task);
                    return;
                }
            }
        };

        tracing::trace!(
            task_id = task.id,
            queue = %task.queue_name,
            attempt = task.attempt,
            "delivering task"
        );
        tokio::spawn(consumer(self.shutdown.child_token(), task));
    }

    /// Pulls the oldest waiting task off `queue`, marking it in flight.
    pub fn take(&self, queue: &str) -> Option<Task> {
        let mut state = self.lock();
        let task = state.ready.get_mut(queue)?.pop_front()?;
        state.in_flight.insert(task.id, task.clone());
        Some(task)
    }

    /// Returns every payload ever enqueued on `queue`, oldest first.
    ///
    /// Empty unless the queue was built with [`InMemoryQueue::with_history`].
    pub fn payloads(&self, queue: &str) -> Vec<Vec<u8>> {
        self.lock().history.get(queue).cloned().unwrap_or_default()
    }

    /// Returns the number of tasks waiting on `queue`.
    pub fn pending_count(&self, queue: &str) -> usize {
        self.lock().ready.get(queue).map_or(0, VecDeque::len)
    }

    /// Returns the number of delivered but unsettled tasks.
    pub fn in_flight_count(&self) -> usize {
        self.lock().in_flight.len()
    }

    /// Returns all acknowledged tasks, in acknowledgement order, if recorded.
    pub fn acked(&self) -> Vec<Task> {
        self.lock().acked.clone()
    }

    /// Returns all retry requests with their delays, in request order, if recorded.
    pub fn retries(&self) -> Vec<(Task, Duration)> {
        self.lock().retries.clone()
    }

    /// Makes the next `n` enqueues fail with [`QueueError::Unavailable`].
    pub fn fail_next_enqueues(&self, n: usize) {
        self.lock().fail_enqueues = n;
    }

    /// Stops accepting tasks and cancels the tokens of in-flight deliveries.
    pub fn shutdown(&self) {
        tracing::info!("shutting down task queue");
        self.shutdown.cancel();
    }

    /// Returns true once [`InMemoryQueue::shutdown`] has been called.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[async_trait]
impl Queue for InMemoryQueue {
    async fn enqueue(&self, queue: &str, payload: Vec<u8>) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(QueueError::Closed);
        }

        let task = {
            let mut state = self.lock();
            if state.fail_enqueues > 0 {
                state.fail_enqueues -= 1;
                return Err(QueueError::Unavailable(
                    "injected enqueue failure".to_string(),
                ));
            }
            state.next_id += 1;
            if state.record_history {
                state
                    .history
                    .entry(queue.to_string())
                    .or_default()
                    .push(payload.clone());
            }
            Task::new(state.next_id, queue, payload)
        };

        metrics::counter!("queue_tasks_enqueued_total", "queue" => queue.to_string())
            .increment(1);
        self.deliver(task);
        Ok(())
    }

    fn consume(&self, queue: &str, consumer: Consumer) {
        let waiting = {
            let mut state = self.lock();
            if state
                .consumers
                .insert(queue.to_string(), consumer)
                .is_some()
            {
                tracing::warn!(%queue, "replacing existing consumer");
            }
            state.ready.remove(queue).unwrap_or_default()
        };

        tracing::info!(%queue, waiting = waiting.len(), "consumer registered");
        for task in waiting {
            self.deliver(task);
        }
    }

    async fn ack(&self, task: &Task) {
        let mut state = self.lock();
        state.in_flight.remove(&task.id);
        if state.record_history {
            state.acked.push(task.clone());
        }
    }

    async fn retry_later(&self, task: Task, delay: Duration) {
        {
            let mut state = self.lock();
            state.in_flight.remove(&task.id);
            if state.record_history {
                state.retries.push((task.clone(), delay));
            }
        }

        let queue = self.clone();
        let task = task.next_attempt();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => queue.deliver(task),
                // Park the task so it survives for a consumer registered later.
                () = queue.shutdown.cancelled() => {
                    queue
                        .lock()
                        .ready
                        .entry(task.queue_name.clone())
                        .or_default()
                        .push_back(task);
                }
            }
        });
    }
}
