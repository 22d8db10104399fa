//! Payloads carried by transfer tasks.

use common::{AccountId, ReferenceId, Status};
use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// Payload of a transaction event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub reference_id: ReferenceId,
    pub source_account_id: AccountId,
    pub target_account_id: AccountId,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// Business error reported by the last activity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// The status the sender believed was current when producing this event.
    pub last_status: Status,
}

impl TransactionInput {
    /// Creates the initial event of a transfer.
    pub fn started(request: TransferRequest) -> Self {
        Self {
            reference_id: request.reference_id,
            source_account_id: request.source_account_id,
            target_account_id: request.target_account_id,
            amount: request.amount,
            error_message: None,
            last_status: Status::Started,
        }
    }

    /// Returns true if the last activity reported a business error.
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }
}

/// The kind of banking operation an activity performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Take the amount out of the source account.
    Withdraw,
    /// Put the amount into the target account.
    Deposit,
    /// Return the amount to the source account.
    Refund,
}

impl ActivityType {
    /// Returns the activity name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Withdraw => "withdraw",
            ActivityType::Deposit => "deposit",
            ActivityType::Refund => "refund",
        }
    }

    /// The account this activity operates on.
    pub fn account<'a>(&self, transaction: &'a TransactionInput) -> &'a AccountId {
        match self {
            ActivityType::Withdraw | ActivityType::Refund => &transaction.source_account_id,
            ActivityType::Deposit => &transaction.target_account_id,
        }
    }

    /// Idempotency token handed to the bank, e.g. `tx-1-withdraw`.
    ///
    /// Redeliveries of the same activity produce the same token.
    pub fn reference_token(&self, reference_id: &ReferenceId) -> String {
        format!("{}-{}", reference_id, self.as_str())
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an activity task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInput {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub account_id: AccountId,
    /// The transaction that scheduled this activity, folded back into the
    /// result event.
    pub transaction: TransactionInput,
}

impl ActivityInput {
    /// Creates an activity for `transaction`, targeting the account the
    /// activity type operates on.
    pub fn new(activity_type: ActivityType, transaction: TransactionInput) -> Self {
        Self {
            activity_type,
            account_id: activity_type.account(&transaction).clone(),
            transaction,
        }
    }
}

/// A request to start a new transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub reference_id: ReferenceId,
    pub source_account_id: AccountId,
    pub target_account_id: AccountId,
    pub amount: i64,
}

impl TransferRequest {
    pub fn new(
        reference_id: impl Into<ReferenceId>,
        source_account_id: impl Into<AccountId>,
        target_account_id: impl Into<AccountId>,
        amount: i64,
    ) -> Self {
        Self {
            reference_id: reference_id.into(),
            source_account_id: source_account_id.into(),
            target_account_id: target_account_id.into(),
            amount,
        }
    }

    /// Checks the request before it enters the saga.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.reference_id.is_empty() {
            return Err(TransferError::InvalidRequest(
                "reference_id must not be empty".to_string(),
            ));
        }
        if self.source_account_id.is_empty() || self.target_account_id.is_empty() {
            return Err(TransferError::InvalidRequest(
                "account ids must not be empty".to_string(),
            ));
        }
        if self.source_account_id == self.target_account_id {
            return Err(TransferError::InvalidRequest(
                "source and target accounts must differ".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(TransferError::InvalidRequest(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}
