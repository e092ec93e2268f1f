//! Contract Test: Change Detection
//!
//! Verifies the reconciliation algorithm's partitioning guarantees:
//! - Every id lands in exactly one of added / removed / changed / unchanged
//! - diff(S, S) is empty for any S
//! - The cache is written only for added and status-changed doctors;
//!   removed doctors are read-only
//!
//! If this test fails, change classification is broken.

mod common;

use common::*;
use medwatch_core::model::{CacheEntry, Doctor};
use medwatch_core::{LocationCache, detect_changes};
use std::collections::HashMap;
use std::time::Duration;

const NOW: i64 = 1_700_000_000;
const TTL: i64 = 7 * 24 * 3600;

fn by_id(doctors: Vec<Doctor>) -> HashMap<String, Doctor> {
    doctors.into_iter().map(|d| (d.id.clone(), d)).collect()
}

fn empty_cache() -> LocationCache {
    LocationCache::new(TTL, Duration::ZERO)
}

#[tokio::test]
async fn partitions_ids_with_no_overlap_or_omission() {
    // previous: A (kept, unchanged), B (kept, status change), C (removed)
    // current:  A, B (new status), D (added)
    let previous = by_id(vec![
        doctor("A", "Disponibile"),
        doctor("B", "Completo"),
        doctor("C", "Disponibile"),
    ]);
    let current = by_id(vec![
        doctor("A", "Disponibile"),
        doctor("B", "Disponibile"),
        doctor("D", "Completo"),
    ]);

    let source = ScriptedSource::new(Vec::new())
        .with_locations("B", vec!["TRENTO"])
        .with_locations("D", vec!["ARCO"]);
    let mut cache = empty_cache();

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    let added: Vec<&str> = changes.added.iter().map(|d| d.id.as_str()).collect();
    let removed: Vec<&str> = changes.removed.iter().map(|d| d.id.as_str()).collect();
    let changed: Vec<&str> = changes
        .changed
        .iter()
        .map(|c| c.doctor.id.as_str())
        .collect();

    assert_eq!(added, vec!["D"]);
    assert_eq!(removed, vec!["C"]);
    assert_eq!(changed, vec!["B"]);

    // A is unchanged: no event in any class, no detail fetch
    for class in [&added, &removed, &changed] {
        assert!(!class.contains(&"A"));
    }
    assert_eq!(source.detail_calls(), vec!["D".to_string(), "B".to_string()]);
}

#[tokio::test]
async fn identical_snapshots_yield_empty_change_set() {
    let snapshot = by_id(vec![
        doctor("A", "Disponibile"),
        doctor("B", "Completo"),
        doctor("C", "Riservato"),
    ]);

    let source = ScriptedSource::new(Vec::new());
    let mut cache = empty_cache();

    let changes = detect_changes(&snapshot, &snapshot, &mut cache, &source, NOW).await;

    assert!(changes.is_empty());
    assert_eq!(source.detail_call_count(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn added_doctor_gets_fresh_locations() {
    let previous = HashMap::new();
    let current = by_id(vec![doctor("A1", "Disponibile")]);

    let source = ScriptedSource::new(Vec::new()).with_locations("A1", vec!["ARCO", "DRO"]);
    let mut cache = empty_cache();

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    assert_eq!(changes.added.len(), 1);
    assert_eq!(changes.added[0].id, "A1");
    assert_eq!(
        changes.added[0].locations,
        Some(vec!["ARCO".to_string(), "DRO".to_string()])
    );
    assert!(changes.removed.is_empty());
    assert!(changes.changed.is_empty());
}

#[tokio::test]
async fn status_change_carries_old_and_new() {
    let previous = by_id(vec![doctor("A1", "Completo")]);
    let current = by_id(vec![doctor("A1", "Disponibile")]);

    let source = ScriptedSource::new(Vec::new()).with_locations("A1", vec!["TRENTO"]);
    let mut cache = empty_cache();

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    assert_eq!(changes.changed.len(), 1);
    let change = &changes.changed[0];
    assert_eq!(change.old_availability, "Completo");
    assert_eq!(change.new_availability, "Disponibile");
    assert_eq!(change.doctor.availability, "Disponibile");
    assert_eq!(change.doctor.locations, Some(vec!["TRENTO".to_string()]));
}

#[tokio::test]
async fn removed_doctor_with_no_cache_entry_gets_empty_locations() {
    let previous = by_id(vec![doctor("A1", "Disponibile")]);
    let current = HashMap::new();

    let source = ScriptedSource::new(Vec::new());
    let mut cache = empty_cache();

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    assert_eq!(changes.removed.len(), 1);
    assert_eq!(changes.removed[0].locations, Some(Vec::new()));

    // Removed is a read-only path: no fetch, no cache write
    assert_eq!(source.detail_call_count(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn removed_doctor_reads_stale_cache_without_fetching() {
    let previous = by_id(vec![doctor("A1", "Disponibile")]);
    let current = HashMap::new();

    let source = ScriptedSource::new(Vec::new());
    let mut entries = HashMap::new();
    entries.insert(
        "A1".to_string(),
        CacheEntry {
            locations: vec!["RIVA DEL GARDA".to_string()],
            // Long expired; removed doctors use whatever is there
            timestamp: NOW - 100 * 24 * 3600,
        },
    );
    let mut cache = LocationCache::from_entries(entries, TTL, Duration::ZERO);

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    assert_eq!(
        changes.removed[0].locations,
        Some(vec!["RIVA DEL GARDA".to_string()])
    );
    assert_eq!(source.detail_call_count(), 0);
}

#[tokio::test]
async fn reappearing_doctor_within_ttl_hits_cache() {
    // A doctor that vanished and came back before its cache entry expired
    // is reported as added, but its locations come from the cache.
    let previous = HashMap::new();
    let current = by_id(vec![doctor("A1", "Disponibile")]);

    let source = ScriptedSource::new(Vec::new()).with_locations("A1", vec!["STALE-WRONG"]);
    let mut entries = HashMap::new();
    entries.insert(
        "A1".to_string(),
        CacheEntry {
            locations: vec!["ARCO".to_string()],
            timestamp: NOW - 60,
        },
    );
    let mut cache = LocationCache::from_entries(entries, TTL, Duration::ZERO);

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    assert_eq!(changes.added[0].locations, Some(vec!["ARCO".to_string()]));
    assert_eq!(source.detail_call_count(), 0);
}

#[tokio::test]
async fn detail_failure_degrades_to_empty_without_aborting() {
    // Two added doctors; the detail fetch for one of them fails
    let previous = HashMap::new();
    let current = by_id(vec![doctor("A1", "Disponibile"), doctor("B2", "Completo")]);

    // Only B2 has scripted locations; A1's detail fetch errors
    let source = ScriptedSource::new(Vec::new()).with_locations("B2", vec!["TRENTO"]);
    let mut cache = empty_cache();

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    assert_eq!(changes.added.len(), 2);
    assert_eq!(changes.added[0].id, "A1");
    assert_eq!(changes.added[0].locations, Some(Vec::new()));
    assert_eq!(changes.added[1].locations, Some(vec!["TRENTO".to_string()]));
}

#[tokio::test]
async fn output_order_is_sorted_by_id() {
    let previous = HashMap::new();
    let current = by_id(vec![
        doctor("C3", "Disponibile"),
        doctor("A1", "Disponibile"),
        doctor("B2", "Disponibile"),
    ]);

    let source = ScriptedSource::new(Vec::new())
        .with_locations("A1", vec![])
        .with_locations("B2", vec![])
        .with_locations("C3", vec![]);
    let mut cache = empty_cache();

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    let ids: Vec<&str> = changes.added.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["A1", "B2", "C3"]);
}

#[tokio::test]
async fn inputs_are_not_mutated() {
    let previous = by_id(vec![doctor("A1", "Completo")]);
    let current = by_id(vec![doctor("A1", "Disponibile")]);
    let current_before = current.clone();
    let previous_before = previous.clone();

    let source = ScriptedSource::new(Vec::new()).with_locations("A1", vec!["ARCO"]);
    let mut cache = empty_cache();

    let changes = detect_changes(&current, &previous, &mut cache, &source, NOW).await;

    // The change-set owns enriched copies; the inputs still have no locations
    assert_eq!(current, current_before);
    assert_eq!(previous, previous_before);
    assert!(changes.changed[0].doctor.locations.is_some());
    assert!(current["A1"].locations.is_none());
}
