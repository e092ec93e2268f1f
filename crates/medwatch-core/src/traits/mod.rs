//! Core traits for the medwatch system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RegistrySource`]: Fetch the current listing and per-doctor details
//! - [`Notifier`]: Deliver a change-set to a messaging channel
//! - [`SnapshotStore`]: Persist the last observed snapshot

pub mod notifier;
pub mod registry_source;
pub mod snapshot_store;

pub use notifier::Notifier;
pub use registry_source::RegistrySource;
pub use snapshot_store::SnapshotStore;
