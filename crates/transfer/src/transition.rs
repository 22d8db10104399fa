//! Transition table of the transfer state machine.

use common::Status;

use crate::input::ActivityType;

/// What the transaction handler does for an event observed at a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to `to`, scheduling `activity` first when present.
    Advance {
        to: Status,
        activity: Option<ActivityType>,
    },
    /// The transfer already finished; the event is dropped.
    Terminal,
}

impl Transition {
    fn advance(to: Status, activity: ActivityType) -> Self {
        Transition::Advance {
            to,
            activity: Some(activity),
        }
    }

    fn finish(to: Status) -> Self {
        Transition::Advance { to, activity: None }
    }
}

/// Computes the next step from the current status and whether the event
/// reports an activity failure.
///
/// | From        | Failed | To          | Activity |
/// |-------------|--------|-------------|----------|
/// | Started     | -      | Withdrawing | withdraw |
/// | Withdrawing | yes    | Failed      |          |
/// | Withdrawing | no     | Depositing  | deposit  |
/// | Depositing  | yes    | Refunding   | refund   |
/// | Depositing  | no     | Succeeded   |          |
/// | Refunding   | yes    | Failed      |          |
/// | Refunding   | no     | Succeeded   |          |
pub fn plan(status: Status, failed: bool) -> Transition {
    match (status, failed) {
        (Status::Started, _) => Transition::advance(Status::Withdrawing, ActivityType::Withdraw),
        (Status::Withdrawing, true) => Transition::finish(Status::Failed),
        (Status::Withdrawing, false) => {
            Transition::advance(Status::Depositing, ActivityType::Deposit)
        }
        (Status::Depositing, true) => Transition::advance(Status::Refunding, ActivityType::Refund),
        (Status::Depositing, false) => Transition::finish(Status::Succeeded),
        // A failed refund needs an operator; there is no second refund.
        (Status::Refunding, true) => Transition::finish(Status::Failed),
        (Status::Refunding, false) => Transition::finish(Status::Succeeded),
        (Status::Succeeded | Status::Failed, _) => Transition::Terminal,
    }
}
