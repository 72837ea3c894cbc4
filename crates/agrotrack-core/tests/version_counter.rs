// crates/agrotrack-core/tests/version_counter.rs
// ============================================================================
// Module: Version Counter Tests
// Description: Validates per-entity generation counters under concurrency.
// ============================================================================
//! ## Overview
//! Exercises counter initialization, bumping, isolation between entities,
//! and exactness under concurrent writers.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::thread;

use agrotrack_core::EntityName;
use agrotrack_core::Event;
use agrotrack_core::NullEventSink;
use agrotrack_core::RecordingEventSink;
use agrotrack_core::VersionCounter;

#[test]
fn first_read_initializes_to_one() {
    let versions = VersionCounter::new();
    assert_eq!(versions.version(&EntityName::worker()), 1);
    assert_eq!(versions.version(&EntityName::worker()), 1);
}

#[test]
fn bump_increments_and_reports_new_version() {
    let versions = VersionCounter::new();
    assert_eq!(versions.bump(&EntityName::worker(), &NullEventSink), 2);
    assert_eq!(versions.version(&EntityName::worker()), 2);
    assert_eq!(versions.bump(&EntityName::worker(), &NullEventSink), 3);
}

#[test]
fn entities_have_independent_counters() {
    let versions = VersionCounter::new();
    versions.bump(&EntityName::worker(), &NullEventSink);
    versions.bump(&EntityName::worker(), &NullEventSink);
    assert_eq!(versions.version(&EntityName::worker()), 3);
    assert_eq!(versions.version(&EntityName::registration()), 1);
}

#[test]
fn bump_emits_version_event() {
    let versions = VersionCounter::new();
    let events = RecordingEventSink::new();
    versions.bump(&EntityName::registration(), &events);
    let recorded = events.recorded();
    assert!(recorded.iter().any(|event| matches!(
        event,
        Event::VersionBumped { entity, version } if entity.as_str() == "Registration" && *version == 2
    )));
}

#[test]
fn concurrent_bumps_are_exact() {
    let versions = VersionCounter::new();
    let threads: u64 = 50;
    let bumps_each: u64 = 20;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let versions = versions.clone();
            thread::spawn(move || {
                for _ in 0..bumps_each {
                    versions.bump(&EntityName::worker(), &NullEventSink);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(versions.version(&EntityName::worker()), 1 + threads * bumps_each);
}
