use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UnknownStatus;
use tokio::sync::RwLock;

use crate::{Persistence, ReferenceId, Result, Status, StoreError};

#[derive(Debug, Default)]
struct StoreState {
    statuses: HashMap<ReferenceId, Status>,
    write_count: usize,
    fail_loads: usize,
    fail_writes: usize,
    force_conflict: bool,
    corrupt_load: bool,
}

/// In-memory status store implementation for testing.
///
/// Provides the same compare-and-swap semantics as the PostgreSQL store,
/// plus hooks to inject transient failures and conflicts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatusStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStatusStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the status of a transfer, bypassing compare-and-swap.
    pub async fn set_status(&self, key: impl Into<ReferenceId>, status: Status) {
        self.state
            .write()
            .await
            .statuses
            .insert(key.into(), status);
    }

    /// Returns the stored status, or None if the transfer was never written.
    pub async fn status_of(&self, key: &ReferenceId) -> Option<Status> {
        self.state.read().await.statuses.get(key).copied()
    }

    /// Returns the number of successful compare-and-swap writes.
    pub async fn write_count(&self) -> usize {
        self.state.read().await.write_count
    }

    /// Makes the next `n` loads fail with [`StoreError::Unavailable`].
    pub async fn fail_next_loads(&self, n: usize) {
        self.state.write().await.fail_loads = n;
    }

    /// Makes the next `n` writes fail with [`StoreError::Unavailable`].
    pub async fn fail_next_writes(&self, n: usize) {
        self.state.write().await.fail_writes = n;
    }

    /// Makes the next load report an unreadable status code.
    ///
    /// Simulates a corrupt record written by something other than this store.
    pub async fn corrupt_next_load(&self) {
        self.state.write().await.corrupt_load = true;
    }

    /// Makes the next write report a conflict even if `expected` matches.
    ///
    /// Simulates a concurrent handler winning the race for the same key.
    pub async fn force_conflict_on_next_write(&self) {
        self.state.write().await.force_conflict = true;
    }
}

#[async_trait]
impl Persistence for InMemoryStatusStore {
    async fn load(&self, key: &ReferenceId) -> Result<Status> {
        let mut state = self.state.write().await;

        if state.fail_loads > 0 {
            state.fail_loads -= 1;
            return Err(StoreError::Unavailable("injected load failure".to_string()));
        }

        if state.corrupt_load {
            state.corrupt_load = false;
            return Err(StoreError::Decode {
                key: key.clone(),
                source: UnknownStatus(-1),
            });
        }

        Ok(state.statuses.get(key).copied().unwrap_or_default())
    }

    async fn compare_and_swap(
        &self,
        key: &ReferenceId,
        new: Status,
        expected: Status,
    ) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_writes > 0 {
            state.fail_writes -= 1;
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }

        let actual = state.statuses.get(key).copied().unwrap_or_default();

        if state.force_conflict {
            state.force_conflict = false;
            return Err(StoreError::Conflict {
                key: key.clone(),
                expected,
                actual,
            });
        }

        if actual != expected {
            return Err(StoreError::Conflict {
                key: key.clone(),
                expected,
                actual,
            });
        }

        state.statuses.insert(key.clone(), new);
        state.write_count += 1;
        Ok(())
    }
}
