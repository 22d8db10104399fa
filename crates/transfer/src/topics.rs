//! Queue names used by the transfer saga.

/// Transaction events submitted from outside the saga.
pub const MONEY_TRANSFER_EVENTS: &str = "money-transfer-events";

/// Activity tasks scheduled by the transaction handler.
pub const MONEY_TRANSFER_ACTIVITIES: &str = "money-transfer-activities";

/// Transaction events carrying activity outcomes back to the transaction handler.
pub const ACTIVITY_RESULTS: &str = "transactions";

/// Suffix of the dead-letter queue paired with every queue.
pub const DEAD_LETTER_SUFFIX: &str = "-DLQ";

/// Returns the dead-letter queue name for `queue`.
pub fn dead_letter_queue(queue: &str) -> String {
    format!("{queue}{DEAD_LETTER_SUFFIX}")
}
