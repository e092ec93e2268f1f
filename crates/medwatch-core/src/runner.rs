//! Run controller
//!
//! The WatchRunner drives one complete observation cycle and exits:
//!
//! ```text
//! ┌────────────────┐
//! │ RegistrySource │─── current listing ───┐
//! └────────────────┘                       ▼
//!                                 ┌────────────────┐
//!                                 │  WatchRunner   │
//!                                 └────────────────┘
//!                                          │
//!          ┌───────────────────────────────┼───────────────────────────┐
//!          ▼                               ▼                           ▼
//! ┌────────────────┐              ┌────────────────┐          ┌────────────────┐
//! │ SnapshotStore  │              │ detect_changes │          │    Notifier    │
//! │ (load/save)    │              │ (+ cache)      │          │ (non-empty)    │
//! └────────────────┘              └────────────────┘          └────────────────┘
//! ```
//!
//! ## Run states
//!
//! - **Bootstrap** (no persisted snapshot): persist the listing with an
//!   empty cache and exit without notifying. This avoids an initial flood
//!   of "added" events for the whole registry, and avoids paying the full
//!   per-doctor location-fetch cost up front.
//! - **Steady** (snapshot present): diff, notify if anything changed,
//!   persist the new snapshot.
//!
//! Persisted state only ever reflects a listing that was fully obtained; a
//! failed run writes nothing, so the next run's diff baseline is never
//! corrupted by a partial observation.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::cache::LocationCache;
use crate::config::WatchConfig;
use crate::diff::detect_changes;
use crate::error::{Error, Result};
use crate::model::{Doctor, Snapshot};
use crate::traits::{Notifier, RegistrySource, SnapshotStore};

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// First run: state seeded, nothing notified
    Bootstrapped {
        /// Number of doctors persisted
        doctors: usize,
    },

    /// Steady-state run completed
    Completed {
        added: usize,
        removed: usize,
        changed: usize,
        /// Whether a notification was delivered. False when there were no
        /// changes, and also when delivery failed (state is persisted
        /// either way).
        notified: bool,
    },
}

/// Orchestrates one bootstrap or steady-state run
pub struct WatchRunner {
    /// Upstream registry
    source: Box<dyn RegistrySource>,

    /// Notification channel
    notifier: Box<dyn Notifier>,

    /// Persisted snapshot
    store: Box<dyn SnapshotStore>,

    /// Location cache TTL in seconds
    cache_ttl_secs: i64,

    /// Pacing delay after each detail fetch
    fetch_delay: std::time::Duration,
}

impl WatchRunner {
    /// Create a new runner
    ///
    /// # Parameters
    ///
    /// - `source`: Registry source implementation
    /// - `notifier`: Notifier implementation
    /// - `store`: Snapshot store implementation
    /// - `config`: Validated on construction
    pub fn new(
        source: Box<dyn RegistrySource>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn SnapshotStore>,
        config: &WatchConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            source,
            notifier,
            store,
            cache_ttl_secs: config.cache.ttl_secs(),
            fetch_delay: config.cache.fetch_delay(),
        })
    }

    /// Execute one run against the wall clock
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_at(chrono::Utc::now().timestamp()).await
    }

    /// Execute one run at a fixed observation time.
    ///
    /// `now` feeds the location cache's freshness checks; tests pin it for
    /// deterministic TTL behavior.
    pub async fn run_at(&self, now: i64) -> Result<RunOutcome> {
        let previous = self.store.load().await?;

        let listing = self.source.fetch_listing().await?;
        if listing.is_empty() {
            // A genuinely empty registry is indistinguishable from a broken
            // scrape; refuse to wipe the baseline over it.
            return Err(Error::listing(
                "listing fetch returned no doctors; aborting without touching state",
            ));
        }
        info!(
            "fetched {} doctors from {}",
            listing.len(),
            self.source.source_name()
        );

        let Some(previous) = previous else {
            let snapshot = Snapshot::from_listing(listing);
            self.store.save(&snapshot).await?;
            info!(
                "first run: initialized state with {} doctors",
                snapshot.doctors.len()
            );
            return Ok(RunOutcome::Bootstrapped {
                doctors: snapshot.doctors.len(),
            });
        };

        let current: HashMap<String, Doctor> =
            listing.into_iter().map(|d| (d.id.clone(), d)).collect();

        let mut cache = LocationCache::from_entries(
            previous.location_cache,
            self.cache_ttl_secs,
            self.fetch_delay,
        );

        let changes = detect_changes(
            &current,
            &previous.doctors,
            &mut cache,
            self.source.as_ref(),
            now,
        )
        .await;

        info!(
            "detected {} changes: {} added, {} removed, {} changed",
            changes.total(),
            changes.added.len(),
            changes.removed.len(),
            changes.changed.len()
        );

        let mut notified = false;
        if changes.is_empty() {
            info!("no changes to post");
        } else {
            match self.notifier.notify(&changes).await {
                Ok(()) => {
                    notified = true;
                    info!("posted changes to {}", self.notifier.channel_name());
                }
                Err(e) => {
                    // Reportable, not fatal: the new snapshot is persisted
                    // regardless of delivery outcome.
                    warn!(
                        "failed to deliver notification via {}: {}",
                        self.notifier.channel_name(),
                        e
                    );
                }
            }
        }

        let snapshot = Snapshot {
            doctors: current,
            location_cache: cache.into_entries(),
        };
        self.store.save(&snapshot).await?;
        info!("state saved: {} doctors", snapshot.doctors.len());

        Ok(RunOutcome::Completed {
            added: changes.added.len(),
            removed: changes.removed.len(),
            changed: changes.changed.len(),
            notified,
        })
    }
}
