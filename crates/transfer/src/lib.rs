//! Durable money-transfer saga driven by a task queue.
//!
//! A transfer moves through withdraw → deposit, with a refund as the
//! compensating step when the deposit fails. Two handlers ping-pong over
//! the queue:
//!
//! 1. The transaction handler checks the event against the stored status,
//!    schedules the next activity and advances the status with
//!    compare-and-swap.
//! 2. The activity handler calls the bank with an idempotency token and
//!    reports the outcome back as a new transaction event.
//!
//! Delivery is at-least-once and unordered. Stale events are discarded,
//! premature ones retried, and every external side effect is keyed by the
//! transfer's reference ID so duplicates are harmless.

pub mod backoff;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod topics;
pub mod transition;
pub mod worker;

pub use common::{AccountId, ReferenceId, Status};
pub use error::{Result, TransferError};
pub use input::{ActivityInput, ActivityType, TransactionInput, TransferRequest};
pub use transition::Transition;
pub use worker::TransferWorker;
