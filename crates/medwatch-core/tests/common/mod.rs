//! Test doubles and common utilities for contract tests
//!
//! This module provides scripted collaborators that verify the core's
//! contracts without any real I/O.

use medwatch_core::error::Result;
use medwatch_core::model::{ChangeSet, Doctor};
use medwatch_core::traits::{Notifier, RegistrySource};
use medwatch_core::{CacheConfig, NotifierConfig, SourceConfig, StateStoreConfig, WatchConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A scripted RegistrySource returning fixed listings and locations
pub struct ScriptedSource {
    /// Listing returned by fetch_listing
    listing: Vec<Doctor>,
    /// Location lists per doctor id; missing ids fail the detail fetch
    locations: HashMap<String, Vec<String>>,
    /// Force fetch_listing to fail
    fail_listing: bool,
    /// Call counter for fetch_listing()
    listing_call_count: Arc<AtomicUsize>,
    /// Call counter for fetch_locations()
    detail_call_count: Arc<AtomicUsize>,
    /// Recorded doctor ids from detail calls
    detail_calls: Arc<std::sync::Mutex<Vec<String>>>,
}

impl ScriptedSource {
    pub fn new(listing: Vec<Doctor>) -> Self {
        Self {
            listing,
            locations: HashMap::new(),
            fail_listing: false,
            listing_call_count: Arc::new(AtomicUsize::new(0)),
            detail_call_count: Arc::new(AtomicUsize::new(0)),
            detail_calls: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// A source whose fetch_listing always fails
    pub fn failing() -> Self {
        let mut source = Self::new(Vec::new());
        source.fail_listing = true;
        source
    }

    /// Script the location list for a doctor id
    pub fn with_locations(mut self, id: &str, locations: Vec<&str>) -> Self {
        self.locations.insert(
            id.to_string(),
            locations.into_iter().map(String::from).collect(),
        );
        self
    }

    /// Get the number of times fetch_listing() was called
    pub fn listing_call_count(&self) -> usize {
        self.listing_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times fetch_locations() was called
    pub fn detail_call_count(&self) -> usize {
        self.detail_call_count.load(Ordering::SeqCst)
    }

    /// Get the doctor ids whose details were fetched, in call order
    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }

    /// Create a new ScriptedSource that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            listing: other.listing.clone(),
            locations: other.locations.clone(),
            fail_listing: other.fail_listing,
            listing_call_count: Arc::clone(&other.listing_call_count),
            detail_call_count: Arc::clone(&other.detail_call_count),
            detail_calls: Arc::clone(&other.detail_calls),
        }
    }
}

#[async_trait::async_trait]
impl RegistrySource for ScriptedSource {
    async fn fetch_listing(&self) -> Result<Vec<Doctor>> {
        self.listing_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(medwatch_core::Error::listing("scripted listing failure"));
        }
        Ok(self.listing.clone())
    }

    async fn fetch_locations(&self, doctor_id: &str) -> Result<Vec<String>> {
        self.detail_call_count.fetch_add(1, Ordering::SeqCst);
        self.detail_calls
            .lock()
            .unwrap()
            .push(doctor_id.to_string());

        self.locations
            .get(doctor_id)
            .cloned()
            .ok_or_else(|| medwatch_core::Error::detail("scripted detail failure"))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A Notifier that records delivered change-sets
pub struct RecordingNotifier {
    /// Force notify to fail
    fail: bool,
    /// Call counter for notify()
    notify_call_count: Arc<AtomicUsize>,
    /// Delivered change-sets
    delivered: Arc<std::sync::Mutex<Vec<ChangeSet>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            fail: false,
            notify_call_count: Arc::new(AtomicUsize::new(0)),
            delivered: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// A notifier whose delivery always fails
    pub fn failing() -> Self {
        let mut notifier = Self::new();
        notifier.fail = true;
        notifier
    }

    /// Get the number of times notify() was called
    pub fn notify_call_count(&self) -> usize {
        self.notify_call_count.load(Ordering::SeqCst)
    }

    /// Get the change-sets delivered so far
    pub fn delivered(&self) -> Vec<ChangeSet> {
        self.delivered.lock().unwrap().clone()
    }

    /// Create a new RecordingNotifier that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            fail: other.fail,
            notify_call_count: Arc::clone(&other.notify_call_count),
            delivered: Arc::clone(&other.delivered),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, changes: &ChangeSet) -> Result<()> {
        self.notify_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(medwatch_core::Error::notify("scripted delivery failure"));
        }
        self.delivered.lock().unwrap().push(changes.clone());
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a doctor record for tests
pub fn doctor(id: &str, availability: &str) -> Doctor {
    Doctor::new(id, "Test", id, availability)
}

/// Helper to create a WatchConfig with no pacing delay
pub fn test_config() -> WatchConfig {
    WatchConfig {
        source: SourceConfig::District {
            district_id: "4".to_string(),
        },
        notifier: NotifierConfig::Telegram {
            bot_token: "123:test-token".to_string(),
            chat_id: "@test".to_string(),
        },
        state_store: StateStoreConfig::Memory,
        cache: CacheConfig {
            ttl_days: 7,
            fetch_delay_secs: 0, // Disabled for tests
        },
    }
}
