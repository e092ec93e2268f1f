//! Data model for the medwatch system
//!
//! The persisted snapshot document has two top-level fields, `doctors` and
//! `location_cache`, both keyed by the doctor's registry code. The document
//! must round-trip losslessly through save/load:
//!
//! ```json
//! {
//!   "doctors": {
//!     "A123": {
//!       "id": "A123",
//!       "first_name": "Maria",
//!       "last_name": "Rossi",
//!       "availability": "Disponibile"
//!     }
//!   },
//!   "location_cache": {
//!     "A123": { "locations": ["ARCO", "RIVA DEL GARDA"], "timestamp": 1722945600 }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single tracked registry record.
///
/// `id` is the registry code extracted from the doctor's detail link. It is
/// globally unique, stable across runs, and the sole identity key for
/// matching between snapshots. `locations` is auxiliary data attached
/// lazily from the detail page; it is omitted from JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub availability: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
}

impl Doctor {
    /// Create a doctor record without locations
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        availability: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            availability: availability.into(),
            locations: None,
        }
    }

    /// Attach a location list, consuming self
    pub fn with_locations(mut self, locations: Vec<String>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Full display name ("first last")
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A cached location list for one doctor.
///
/// `timestamp` is epoch seconds at the moment of the fetch attempt. It is
/// non-decreasing for a given key across a process's writes: each refresh
/// overwrites the whole entry, there is no merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub locations: Vec<String>,
    pub timestamp: i64,
}

/// The complete persisted state at the end of a run.
///
/// Loaded once at process start; a new snapshot fully replaces it at
/// process end. There is no partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub doctors: HashMap<String, Doctor>,
    #[serde(default)]
    pub location_cache: HashMap<String, CacheEntry>,
}

impl Snapshot {
    /// Build a bootstrap snapshot from a freshly fetched listing, with an
    /// empty location cache.
    pub fn from_listing(listing: Vec<Doctor>) -> Self {
        Self {
            doctors: listing.into_iter().map(|d| (d.id.clone(), d)).collect(),
            location_cache: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }
}

/// One availability transition for a doctor present in both snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityChange {
    /// The record as currently observed (carries the new availability)
    pub doctor: Doctor,
    pub old_availability: String,
    pub new_availability: String,
}

/// The classified difference between two snapshots.
///
/// Produced once per run and consumed once by the notifier; never
/// persisted. Location lists are owned copies, the change-set does not
/// alias cache state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<Doctor>,
    pub removed: Vec<Doctor>,
    pub changed: Vec<AvailabilityChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of events across all three classes
    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}
