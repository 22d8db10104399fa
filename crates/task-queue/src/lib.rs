//! Persistent task queue contract.
//!
//! Tasks are delivered at least once, in no particular order, possibly
//! concurrently with other deliveries of the same task. Consumers acknowledge
//! a task to remove it or ask for a delayed redelivery, which bumps the
//! task's attempt counter.

pub mod error;
pub mod memory;
pub mod queue;
pub mod task;

pub use error::{QueueError, Result};
pub use memory::InMemoryQueue;
pub use queue::{Consumer, Queue};
pub use task::Task;
pub use tokio_util::sync::CancellationToken;
