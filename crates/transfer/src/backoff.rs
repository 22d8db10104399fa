//! Redelivery delay policy.

use std::time::Duration;

/// Delay before the first redelivery.
pub const INITIAL_INTERVAL: Duration = Duration::from_millis(500);

/// Exponential backoff without jitter: `500ms × 2^attempt`.
///
/// There is no cap and no attempt limit; the delay only saturates instead of
/// overflowing.
pub fn delay_for(attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    INITIAL_INTERVAL.saturating_mul(factor)
}
