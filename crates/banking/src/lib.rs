//! External banking API consumed by transfer activities.

pub mod memory;
pub mod service;

pub use common::AccountId;
pub use memory::{InMemoryBank, Operation, OperationKind};
pub use service::{BankingError, BankingService, Confirmation};
