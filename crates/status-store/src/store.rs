use async_trait::async_trait;

use crate::{ReferenceId, Result, Status};

/// Key-value persistence of transfer statuses with optimistic concurrency.
///
/// Implementations must be thread-safe (Send + Sync); handlers call them
/// concurrently for the same key and rely on `compare_and_swap` alone for
/// coordination.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Loads the current status of a transfer.
    ///
    /// A transfer that was never written loads as [`Status::Started`].
    async fn load(&self, key: &ReferenceId) -> Result<Status>;

    /// Stores `new` if the current status equals `expected`.
    ///
    /// Fails with [`StoreError::Conflict`](crate::StoreError::Conflict) when
    /// the stored status differs from `expected`.
    async fn compare_and_swap(
        &self,
        key: &ReferenceId,
        new: Status,
        expected: Status,
    ) -> Result<()>;
}
