//! Transfer status lattice.

use serde::{Deserialize, Serialize};

/// The status of a transfer.
///
/// The declaration order is load-bearing: the stored status of a transfer only
/// moves forward in this order, and event consistency checks compare statuses
/// with `<` / `>`.
///
/// ```text
/// Started ──► Withdrawing ──┬──► Depositing ──┬──► Succeeded
///                           │                 └──► Refunding ──┬──► Succeeded
///                           └──► Failed                        └──► Failed
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(i16)]
pub enum Status {
    /// Transfer accepted, nothing executed yet.
    #[default]
    Started = 0,

    /// Terminal: the transfer did not happen, or the refund failed.
    Failed = 1,

    /// Terminal: money arrived at the target, or was returned to the source.
    Succeeded = 2,

    /// Withdrawal from the source account is scheduled.
    Withdrawing = 3,

    /// Deposit into the target account is scheduled.
    Depositing = 4,

    /// Deposit failed, refund into the source account is scheduled.
    Refunding = 5,
}

/// Returned when a stored status code does not map to a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStatus(pub i16);

impl std::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown status code {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl Status {
    /// All statuses in declaration order.
    pub const ALL: [Status; 6] = [
        Status::Started,
        Status::Failed,
        Status::Succeeded,
        Status::Withdrawing,
        Status::Depositing,
        Status::Refunding,
    ];

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Succeeded | Status::Failed)
    }

    /// Returns true if `next` is a legal successor of this status.
    pub fn can_transition_to(&self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Started, Status::Withdrawing)
                | (Status::Withdrawing, Status::Failed | Status::Depositing)
                | (Status::Depositing, Status::Refunding | Status::Succeeded)
                | (Status::Refunding, Status::Failed | Status::Succeeded)
        )
    }

    /// Numeric code used by storage backends.
    pub fn as_i16(&self) -> i16 {
        *self as i16
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Started => "Started",
            Status::Failed => "Failed",
            Status::Succeeded => "Succeeded",
            Status::Withdrawing => "Withdrawing",
            Status::Depositing => "Depositing",
            Status::Refunding => "Refunding",
        }
    }
}

impl TryFrom<i16> for Status {
    type Error = UnknownStatus;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_i16() == code)
            .ok_or(UnknownStatus(code))
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
