pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{ReferenceId, Status};
pub use error::{Result, StoreError};
pub use memory::InMemoryStatusStore;
pub use postgres::PostgresStatusStore;
pub use store::Persistence;
