// # Memory Snapshot Store
//
// In-memory implementation of SnapshotStore.
//
// ## Purpose
//
// Holds the snapshot for the lifetime of the process only. Every process
// start looks like a bootstrap run unless a snapshot is seeded first.
//
// ## When to Use
//
// - Testing
// - One-off dry runs where persistence is not wanted

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::model::Snapshot;
use crate::traits::SnapshotStore;

/// In-memory snapshot store implementation
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<RwLock<Option<Snapshot>>>,
}

impl MemorySnapshotStore {
    /// Create an empty store (next run bootstraps)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a prior snapshot (next run is steady)
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(snapshot))),
        }
    }

    /// Read the currently held snapshot, if any
    pub async fn current(&self) -> Option<Snapshot> {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), Error> {
        *self.inner.write().await = Some(snapshot.clone());
        Ok(())
    }
}
