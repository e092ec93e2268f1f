//! Snapshot reconciliation
//!
//! The change detector computes a three-way classification between the
//! freshly observed listing and the previously persisted one:
//!
//! 1. **Added**: id in current only. Locations resolved through the cache
//!    (a doctor that disappeared and reappeared within the TTL gets a
//!    legitimate cache hit).
//! 2. **Removed**: id in previous only. Locations read from the cache
//!    without fetching — the detail page may no longer exist — defaulting
//!    to an empty list.
//! 3. **Changed**: id in both with differing availability. Locations
//!    resolved through the cache; the event is significant enough to pay
//!    the miss cost once per TTL window.
//!
//! Doctors present in both snapshots with unchanged availability produce
//! no event and no cache touch. The cache is written only on paths 1 and
//! 3; path 2 is read-only.

use std::collections::HashMap;

use crate::cache::LocationCache;
use crate::model::{AvailabilityChange, ChangeSet, Doctor};
use crate::traits::RegistrySource;

/// Classify the difference between two snapshots.
///
/// Ids are visited in sorted order within each class, so the grouping of
/// the returned change-set is deterministic. Location lists are cloned
/// into the returned records; neither input map is mutated and the
/// change-set never aliases cache state.
///
/// Detail-page failures degrade to empty location lists inside the cache
/// and never abort the diff. A valid `current` is the caller's
/// precondition: producing it is the registry source's contract, and its
/// failure terminates the run before this function is reached.
///
/// # Parameters
///
/// - `current`: The freshly observed listing, keyed by doctor id
/// - `previous`: The persisted baseline, keyed by doctor id
/// - `cache`: Location cache, mutated in place by fresh lookups
/// - `source`: Detail-page fetcher, consulted through the cache
/// - `now`: Current time, epoch seconds
pub async fn detect_changes(
    current: &HashMap<String, Doctor>,
    previous: &HashMap<String, Doctor>,
    cache: &mut LocationCache,
    source: &dyn RegistrySource,
    now: i64,
) -> ChangeSet {
    let mut changes = ChangeSet::default();

    let mut current_ids: Vec<&str> = current.keys().map(String::as_str).collect();
    current_ids.sort_unstable();
    let mut previous_ids: Vec<&str> = previous.keys().map(String::as_str).collect();
    previous_ids.sort_unstable();

    for &id in &current_ids {
        if !previous.contains_key(id) {
            let locations = cache.resolve(id, source, now).await;
            changes
                .added
                .push(current[id].clone().with_locations(locations));
        }
    }

    for &id in &previous_ids {
        if !current.contains_key(id) {
            let locations = cache.peek(id).map(<[String]>::to_vec).unwrap_or_default();
            changes
                .removed
                .push(previous[id].clone().with_locations(locations));
        }
    }

    for &id in &current_ids {
        if let Some(before) = previous.get(id) {
            let after = &current[id];
            if after.availability != before.availability {
                let locations = cache.resolve(id, source, now).await;
                changes.changed.push(AvailabilityChange {
                    doctor: after.clone().with_locations(locations),
                    old_availability: before.availability.clone(),
                    new_availability: after.availability.clone(),
                });
            }
        }
    }

    changes
}
