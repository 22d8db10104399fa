//! Banking service trait and error classification.

use async_trait::async_trait;
use thiserror::Error;

use crate::AccountId;

/// Confirmation returned by the bank for an executed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// The confirmation ID assigned by the bank.
    pub confirmation_id: String,
}

/// Errors returned by the banking service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankingError {
    /// The account does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// The account balance does not cover the withdrawal.
    #[error("insufficient funds in account {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        account: AccountId,
        requested: i64,
        available: i64,
    },

    /// The amount is zero or negative.
    #[error("invalid amount {0}: must be positive")]
    InvalidAmount(i64),

    /// The bank could not be reached or failed internally.
    #[error("banking service unavailable: {0}")]
    Unavailable(String),
}

impl BankingError {
    /// Returns true for business errors, which retrying cannot fix.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            BankingError::AccountNotFound(_)
                | BankingError::InsufficientFunds { .. }
                | BankingError::InvalidAmount(_)
        )
    }
}

/// Trait for the bank's money-moving operations.
///
/// Both operations are idempotent per `reference`: repeating a call with a
/// reference that already succeeded returns the original confirmation
/// without moving money again.
#[async_trait]
pub trait BankingService: Send + Sync {
    /// Withdraws `amount` (smallest currency unit) from an account.
    async fn withdraw(
        &self,
        account: &AccountId,
        amount: i64,
        reference: &str,
    ) -> Result<Confirmation, BankingError>;

    /// Deposits `amount` (smallest currency unit) into an account.
    async fn deposit(
        &self,
        account: &AccountId,
        amount: i64,
        reference: &str,
    ) -> Result<Confirmation, BankingError>;
}
