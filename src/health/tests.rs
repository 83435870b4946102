//! Unit tests for health module.

use super::*;
use std::sync::Arc;

const T: u64 = 1_700_000_000_000;

#[test]
fn test_new_tracker_is_not_ready() {
    let tracker = HealthTracker::new();
    assert!(!tracker.is_ready(DEFAULT_READY_WINDOW_MS));
    assert!(!tracker.is_ready_at(T, DEFAULT_READY_WINDOW_MS));
    assert_eq!(tracker.snapshot(), HealthSnapshot::default());
}

#[test]
fn test_record_success_makes_ready() {
    let tracker = HealthTracker::new();
    tracker.record_success();

    assert!(tracker.is_ready(DEFAULT_READY_WINDOW_MS));
    assert!(tracker.snapshot().has_succeeded());
    assert!(!tracker.snapshot().has_failed());
}

#[test]
fn test_readiness_window_boundaries() {
    let tracker = HealthTracker::new();
    tracker.record_success_at(T);

    assert!(tracker.is_ready_at(T, DEFAULT_READY_WINDOW_MS));
    assert!(tracker.is_ready_at(T + 30_000, DEFAULT_READY_WINDOW_MS));
    assert!(tracker.is_ready_at(T + 60_000, DEFAULT_READY_WINDOW_MS));
    assert!(!tracker.is_ready_at(T + 60_001, DEFAULT_READY_WINDOW_MS));
    assert!(!tracker.is_ready_at(T + 3_600_000, DEFAULT_READY_WINDOW_MS));
}

#[test]
fn test_custom_window() {
    let tracker = HealthTracker::new();
    tracker.record_success_at(T);

    assert!(tracker.is_ready_at(T + 5_000, 5_000));
    assert!(!tracker.is_ready_at(T + 5_001, 5_000));
}

#[test]
fn test_success_stamped_in_future_counts_as_fresh() {
    let tracker = HealthTracker::new();
    tracker.record_success_at(T + 1_000);
    assert!(tracker.is_ready_at(T, DEFAULT_READY_WINDOW_MS));
}

#[test]
fn test_failure_does_not_clear_readiness() {
    let tracker = HealthTracker::new();
    tracker.record_success_at(T);
    tracker.record_failure_at(T + 1_000);

    assert!(tracker.is_ready_at(T + 2_000, DEFAULT_READY_WINDOW_MS));
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.last_success_ms, T);
    assert_eq!(snapshot.last_failure_ms, T + 1_000);
}

#[test]
fn test_failure_only_is_not_ready() {
    let tracker = HealthTracker::new();
    tracker.record_failure();

    assert!(!tracker.is_ready(DEFAULT_READY_WINDOW_MS));
    assert!(tracker.snapshot().has_failed());
    assert_eq!(tracker.snapshot().last_success_ms, 0);
}

#[test]
fn test_last_write_wins() {
    let tracker = HealthTracker::new();
    tracker.record_failure_at(T + 10);
    tracker.record_failure_at(T + 5);
    assert_eq!(tracker.snapshot().last_failure_ms, T + 5);
}

#[test]
fn test_snapshot_does_not_mutate() {
    let tracker = HealthTracker::new();
    tracker.record_success_at(T);
    let first = tracker.snapshot();
    let second = tracker.snapshot();
    assert_eq!(first, second);
}

#[test]
fn test_snapshot_serializes_field_names() {
    let snapshot = HealthSnapshot {
        last_success_ms: 1,
        last_failure_ms: 2,
    };
    let json = serde_json::to_value(snapshot).unwrap();
    assert_eq!(json["last_success_ms"], 1);
    assert_eq!(json["last_failure_ms"], 2);
}

#[test]
fn test_concurrent_updates() {
    let tracker = Arc::new(HealthTracker::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                if i % 2 == 0 {
                    tracker.record_success_at(T + i);
                } else {
                    tracker.record_failure_at(T + i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = tracker.snapshot();
    assert!(snapshot.last_success_ms >= T && snapshot.last_success_ms < T + 8);
    assert!(snapshot.last_failure_ms >= T && snapshot.last_failure_ms < T + 8);
}

#[test]
fn test_now_ms_is_recent() {
    // 2020-01-01T00:00:00Z
    assert!(now_ms() > 1_577_836_800_000);
}
