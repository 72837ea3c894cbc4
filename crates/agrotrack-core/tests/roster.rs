// crates/agrotrack-core/tests/roster.rs
// ============================================================================
// Module: Worker Roster Tests
// Description: Validates cached roster listing and account lifecycle.
// ============================================================================
//! ## Overview
//! Exercises the roster service end to end: sorted and filtered listings
//! through the cache facade, write-path invalidation, point lookups, and
//! the identity-plus-profile creation unit.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use agrotrack_core::CachedPager;
use agrotrack_core::CancelToken;
use agrotrack_core::InMemoryIdentityDirectory;
use agrotrack_core::InMemoryWorkerStore;
use agrotrack_core::MemoryCache;
use agrotrack_core::NewWorkerAccount;
use agrotrack_core::PageError;
use agrotrack_core::QueryError;
use agrotrack_core::RecordingEventSink;
use agrotrack_core::Timestamp;
use agrotrack_core::VersionCounter;
use agrotrack_core::WorkerId;
use agrotrack_core::WorkerRoster;

type TestRoster =
    WorkerRoster<InMemoryWorkerStore, InMemoryIdentityDirectory, MemoryCache, RecordingEventSink>;

fn roster() -> TestRoster {
    let pager =
        CachedPager::new(MemoryCache::new(), VersionCounter::new(), RecordingEventSink::new());
    WorkerRoster::new(InMemoryWorkerStore::new(), InMemoryIdentityDirectory::new(), pager)
}

fn account(first: &str, last: &str, email: &str, position: Option<&str>) -> NewWorkerAccount {
    NewWorkerAccount {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone_number: None,
        position: position.map(str::to_string),
        password_hash: "argon2id$fixture-hash".to_string(),
    }
}

fn seeded() -> TestRoster {
    let roster = roster();
    roster.create(&account("Karel", "Zima", "karel@farm.example", Some("Mechanic"))).unwrap();
    roster.create(&account("Alena", "Bila", "alena@farm.example", Some("Agronomist"))).unwrap();
    roster.create(&account("Marek", "Dvorak", "marek@farm.example", None)).unwrap();
    roster
}

#[test]
fn listing_defaults_to_last_name_ascending() {
    let roster = seeded();
    let page = roster
        .list(1, 10, None, None, None, Timestamp::Logical(0), &CancelToken::new())
        .unwrap();
    let last_names: Vec<&str> = page.items.iter().map(|w| w.last_name.as_str()).collect();
    assert_eq!(last_names, vec!["Bila", "Dvorak", "Zima"]);
    assert_eq!(page.total_items, 3);
}

#[test]
fn unknown_sort_key_falls_back_to_last_name() {
    let roster = seeded();
    let fallback = roster
        .list(1, 10, Some("salary'; DROP"), None, None, Timestamp::Logical(0), &CancelToken::new())
        .unwrap();
    let default = roster
        .list(1, 10, None, None, None, Timestamp::Logical(1), &CancelToken::new())
        .unwrap();
    assert_eq!(fallback.items, default.items);
}

#[test]
fn descending_direction_reverses_order() {
    let roster = seeded();
    let page = roster
        .list(1, 10, Some("lastName"), Some("DESC"), None, Timestamp::Logical(0), &CancelToken::new())
        .unwrap();
    let last_names: Vec<&str> = page.items.iter().map(|w| w.last_name.as_str()).collect();
    assert_eq!(last_names, vec!["Zima", "Dvorak", "Bila"]);
}

#[test]
fn search_filters_across_fields_case_insensitively() {
    let roster = seeded();
    let by_name = roster
        .list(1, 10, None, None, Some("AREK"), Timestamp::Logical(0), &CancelToken::new())
        .unwrap();
    assert_eq!(by_name.items.len(), 1);
    assert_eq!(by_name.items[0].first_name, "Marek");

    let by_position = roster
        .list(1, 10, None, None, Some("agronomist"), Timestamp::Logical(1), &CancelToken::new())
        .unwrap();
    assert_eq!(by_position.items.len(), 1);
    assert_eq!(by_position.items[0].first_name, "Alena");
}

#[test]
fn invalid_page_coordinates_are_rejected() {
    let roster = seeded();
    let result =
        roster.list(0, 10, None, None, None, Timestamp::Logical(0), &CancelToken::new());
    assert!(matches!(
        result,
        Err(QueryError::Page(PageError::InvalidArgument { .. }))
    ));
}

#[test]
fn create_invalidates_cached_listings() {
    let roster = seeded();
    let now = Timestamp::Logical(0);
    let cancel = CancelToken::new();

    let before = roster.list(1, 10, None, None, None, now, &cancel).unwrap();
    assert_eq!(before.total_items, 3);

    roster.create(&account("Petr", "Adam", "petr@farm.example", None)).unwrap();

    // Same coordinates, same instant: only invalidation explains the
    // fresh answer.
    let after = roster.list(1, 10, None, None, None, now, &cancel).unwrap();
    assert_eq!(after.total_items, 4);
    assert_eq!(after.items[0].last_name, "Adam");
}

#[test]
fn create_rolls_back_identity_when_profile_insert_fails() {
    let roster = roster();
    roster.create(&account("Karel", "Zima", "karel@farm.example", None)).unwrap();

    // Same email: the directory accepts nothing, or the profile store
    // rejects it; either way no orphan identity may remain.
    let result = roster.create(&account("Karel", "Zima", "karel@farm.example", None));
    assert!(result.is_err());

    let page = roster
        .list(1, 10, None, None, None, Timestamp::Logical(0), &CancelToken::new())
        .unwrap();
    assert_eq!(page.total_items, 1);
}

#[test]
fn point_lookup_is_cached_until_update() {
    let roster = seeded();
    let now = Timestamp::Logical(0);

    let id = WorkerId::new(1);
    let mut worker = roster.get(id, now).unwrap().unwrap();
    assert_eq!(worker.first_name, "Karel");

    worker.position = Some("Senior Mechanic".to_string());
    roster.update(&worker).unwrap();

    let reread = roster.get(id, now).unwrap().unwrap();
    assert_eq!(reread.position.as_deref(), Some("Senior Mechanic"));
}

#[test]
fn delete_removes_worker_from_listing_and_point_cache() {
    let roster = seeded();
    let now = Timestamp::Logical(0);
    let cancel = CancelToken::new();

    let id = WorkerId::new(2);
    assert!(roster.get(id, now).unwrap().is_some());
    roster.delete(id).unwrap();

    assert!(roster.get(id, now).unwrap().is_none());
    let page = roster.list(1, 10, None, None, None, now, &cancel).unwrap();
    assert_eq!(page.total_items, 2);
}

#[test]
fn cancelled_listing_is_reported_and_uncached() {
    let roster = seeded();
    let now = Timestamp::Logical(0);

    let cancel = CancelToken::new();
    cancel.cancel();
    let result = roster.list(1, 10, None, None, None, now, &cancel);
    assert!(matches!(result, Err(QueryError::Page(PageError::Cancelled))));

    let fresh = roster.list(1, 10, None, None, None, now, &CancelToken::new()).unwrap();
    assert_eq!(fresh.total_items, 3);
}

#[test]
fn pagination_windows_the_sorted_roster() {
    let roster = seeded();
    let now = Timestamp::Logical(0);
    let cancel = CancelToken::new();

    let first = roster.list(1, 2, None, None, None, now, &cancel).unwrap();
    let second = roster.list(2, 2, None, None, None, now, &cancel).unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(second.items.len(), 1);
    assert_eq!(first.total_pages(), 2);
    assert_eq!(second.items[0].last_name, "Zima");
}
