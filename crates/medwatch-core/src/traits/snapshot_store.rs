// # Snapshot Store Trait
//
// Defines the interface for persisting the observed snapshot between runs.
//
// ## Purpose
//
// The snapshot store is the diff baseline:
// - Loaded once at process start
// - Replaced wholesale at process end
//
// An absent snapshot signals the bootstrap run. A failed run writes
// nothing, so the previous baseline survives untouched.
//
// ## Implementations
//
// - File-based JSON: [`crate::state::FileSnapshotStore`]
// - In-memory: [`crate::state::MemorySnapshotStore`]

use async_trait::async_trait;

use crate::model::Snapshot;

/// Trait for snapshot store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Snapshot))`: A prior snapshot exists (steady state). A
    ///   malformed document is recovered as an empty snapshot with a
    ///   logged warning rather than an error.
    /// - `Ok(None)`: No prior snapshot (bootstrap run)
    /// - `Err(Error)`: Storage error
    async fn load(&self) -> Result<Option<Snapshot>, crate::Error>;

    /// Replace the persisted snapshot wholesale
    ///
    /// The write must be atomic enough that a crash never leaves a
    /// half-written document as the next run's baseline.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully persisted
    /// - `Err(Error)`: Storage error
    async fn save(&self, snapshot: &Snapshot) -> Result<(), crate::Error>;
}
