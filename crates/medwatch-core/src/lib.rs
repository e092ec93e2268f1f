// # medwatch-core
//
// Core library for the medwatch registry change monitor.
//
// ## Architecture Overview
//
// This library provides the state-diffing and caching engine behind the
// monitor:
// - **RegistrySource**: Trait for fetching the current doctor listing and
//   per-doctor location details
// - **Notifier**: Trait for delivering a change-set to a messaging channel
// - **SnapshotStore**: Trait for persisting the last observed snapshot
// - **LocationCache**: TTL-bounded side-cache of per-doctor location lists
// - **detect_changes**: The added/removed/changed reconciliation algorithm
// - **WatchRunner**: Orchestrates bootstrap vs. steady-state runs
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Library-First**: All core functionality can be used as a library
// 3. **Run-to-Completion**: One observation, one diff, one persist per run
// 4. **Degrade Locally**: A single failed detail fetch never aborts a run

pub mod cache;
pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod runner;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use cache::LocationCache;
pub use config::{CacheConfig, NotifierConfig, SourceConfig, StateStoreConfig, WatchConfig};
pub use diff::detect_changes;
pub use error::{Error, Result};
pub use model::{AvailabilityChange, CacheEntry, ChangeSet, Doctor, Snapshot};
pub use runner::{RunOutcome, WatchRunner};
pub use state::{FileSnapshotStore, MemorySnapshotStore};
pub use traits::{Notifier, RegistrySource, SnapshotStore};
