//! TTL-bounded side-cache of per-doctor location lists
//!
//! Detail pages are expensive to fetch (one HTTP round-trip each, paced),
//! so resolved location lists are cached with a timestamp and reused until
//! they go stale. The cache lives inside the persisted snapshot and
//! survives across runs.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::model::CacheEntry;
use crate::traits::RegistrySource;

/// In-memory view of the location cache for one run.
///
/// Constructed from the persisted `location_cache` map at the start of a
/// run, mutated in place by [`resolve`](LocationCache::resolve) during the
/// diff, and converted back for persistence at the end.
///
/// # Freshness
///
/// An entry is fresh while `now - timestamp < ttl_secs`. A TTL of zero or
/// below makes every lookup a miss, forcing a fetch each time.
///
/// # Failure handling
///
/// A failed detail fetch degrades to an empty location list, but the entry
/// is still recorded at `now` so a failing endpoint is not re-fetched on
/// every run inside the TTL window.
#[derive(Debug)]
pub struct LocationCache {
    entries: HashMap<String, CacheEntry>,
    ttl_secs: i64,
    fetch_delay: Duration,
}

impl LocationCache {
    /// Create an empty cache
    pub fn new(ttl_secs: i64, fetch_delay: Duration) -> Self {
        Self::from_entries(HashMap::new(), ttl_secs, fetch_delay)
    }

    /// Wrap a persisted cache map
    pub fn from_entries(
        entries: HashMap<String, CacheEntry>,
        ttl_secs: i64,
        fetch_delay: Duration,
    ) -> Self {
        Self {
            entries,
            ttl_secs,
            fetch_delay,
        }
    }

    /// Consume the cache back into its persistable map
    pub fn into_entries(self) -> HashMap<String, CacheEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a cached location list without fetching or touching timestamps.
    ///
    /// Used for removed doctors, whose detail page may no longer exist.
    /// Staleness is deliberately ignored here: an old list is better than
    /// none for a record that is going away.
    pub fn peek(&self, doctor_id: &str) -> Option<&[String]> {
        self.entries.get(doctor_id).map(|e| e.locations.as_slice())
    }

    /// Get the location list for a doctor, fetching on miss or expiry.
    ///
    /// On a cache miss the entry is overwritten with the fetch result (or
    /// an empty list on failure) stamped at `now`, and the configured
    /// pacing delay is awaited before returning.
    ///
    /// # Parameters
    ///
    /// - `doctor_id`: The registry code identifying the doctor
    /// - `source`: Detail-page fetcher
    /// - `now`: Current time, epoch seconds
    pub async fn resolve(
        &mut self,
        doctor_id: &str,
        source: &dyn RegistrySource,
        now: i64,
    ) -> Vec<String> {
        if let Some(entry) = self.entries.get(doctor_id)
            && now - entry.timestamp < self.ttl_secs
        {
            debug!("location cache hit for {}", doctor_id);
            return entry.locations.clone();
        }

        debug!("location cache miss for {}, fetching detail page", doctor_id);
        let locations = match source.fetch_locations(doctor_id).await {
            Ok(locations) => locations,
            Err(e) => {
                warn!("failed to fetch locations for {}: {}", doctor_id, e);
                Vec::new()
            }
        };

        self.entries.insert(
            doctor_id.to_string(),
            CacheEntry {
                locations: locations.clone(),
                timestamp: now,
            },
        );

        // Pace outbound detail requests to the upstream source
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        locations
    }
}
