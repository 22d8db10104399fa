//! In-memory bank for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{AccountId, BankingError, BankingService, Confirmation};

/// Direction of an executed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Withdraw,
    Deposit,
}

/// An operation that actually moved money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub account: AccountId,
    pub amount: i64,
    pub reference: String,
}

#[derive(Debug, Default)]
struct BankState {
    balances: HashMap<AccountId, i64>,
    confirmations: HashMap<String, Confirmation>,
    operations: Vec<Operation>,
    next_id: u32,
    calls: usize,
    fail_calls: usize,
}

impl BankState {
    fn execute(
        &mut self,
        kind: OperationKind,
        account: &AccountId,
        amount: i64,
        reference: &str,
    ) -> Result<Confirmation, BankingError> {
        self.calls += 1;

        if self.fail_calls > 0 {
            self.fail_calls -= 1;
            return Err(BankingError::Unavailable("connection reset".to_string()));
        }

        if let Some(confirmation) = self.confirmations.get(reference) {
            tracing::debug!(%reference, "duplicate reference, returning original confirmation");
            return Ok(confirmation.clone());
        }

        if amount <= 0 {
            return Err(BankingError::InvalidAmount(amount));
        }

        let balance = self
            .balances
            .get_mut(account)
            .ok_or_else(|| BankingError::AccountNotFound(account.clone()))?;

        match kind {
            OperationKind::Withdraw => {
                if *balance < amount {
                    return Err(BankingError::InsufficientFunds {
                        account: account.clone(),
                        requested: amount,
                        available: *balance,
                    });
                }
                *balance -= amount;
            }
            OperationKind::Deposit => {
                *balance = balance.checked_add(amount).ok_or_else(|| {
                    BankingError::Unavailable(format!("balance overflow in account {account}"))
                })?;
            }
        }

        self.next_id += 1;
        let confirmation = Confirmation {
            confirmation_id: format!("CNF-{:04}", self.next_id),
        };
        self.confirmations
            .insert(reference.to_string(), confirmation.clone());
        self.operations.push(Operation {
            kind,
            account: account.clone(),
            amount,
            reference: reference.to_string(),
        });

        Ok(confirmation)
    }
}

/// In-memory bank with reference-token idempotency.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBank {
    state: Arc<Mutex<BankState>>,
}

impl InMemoryBank {
    /// Creates a new bank with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an account with the given balance, replacing any existing one.
    pub async fn open_account(&self, account: impl Into<AccountId>, balance: i64) {
        self.state
            .lock()
            .await
            .balances
            .insert(account.into(), balance);
    }

    /// Returns the balance of an account, if it exists.
    pub async fn balance(&self, account: &AccountId) -> Option<i64> {
        self.state.lock().await.balances.get(account).copied()
    }

    /// Makes the next `n` calls fail with [`BankingError::Unavailable`].
    pub async fn fail_next_calls(&self, n: usize) {
        self.state.lock().await.fail_calls = n;
    }

    /// Returns the operations that moved money, in execution order.
    pub async fn operations(&self) -> Vec<Operation> {
        self.state.lock().await.operations.clone()
    }

    /// Returns the total number of calls, including failed and duplicate ones.
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.calls
    }
}

#[async_trait]
impl BankingService for InMemoryBank {
    async fn withdraw(
        &self,
        account: &AccountId,
        amount: i64,
        reference: &str,
    ) -> Result<Confirmation, BankingError> {
        self.state
            .lock()
            .await
            .execute(OperationKind::Withdraw, account, amount, reference)
    }

    async fn deposit(
        &self,
        account: &AccountId,
        amount: i64,
        reference: &str,
    ) -> Result<Confirmation, BankingError> {
        self.state
            .lock()
            .await
            .execute(OperationKind::Deposit, account, amount, reference)
    }
}
