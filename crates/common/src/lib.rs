//! Shared types for the money-transfer engine.

pub mod status;
pub mod types;

pub use status::{Status, UnknownStatus};
pub use types::{AccountId, ReferenceId};
