// crates/agrotrack-core/tests/cached_pager.rs
// ============================================================================
// Module: Cached Pager Tests
// Description: Validates read-through caching, invalidation, and degradation.
// ============================================================================
//! ## Overview
//! Exercises the version-keyed cache facade: repeat queries served without
//! the loader, version bumps forcing reloads, cache failures degrading to
//! misses, and cancelled loads never populating the cache.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::cell::Cell;

use agrotrack_core::CacheError;
use agrotrack_core::CacheStore;
use agrotrack_core::CachedPager;
use agrotrack_core::CancelToken;
use agrotrack_core::EntityName;
use agrotrack_core::Event;
use agrotrack_core::MemoryCache;
use agrotrack_core::PageError;
use agrotrack_core::PagedResult;
use agrotrack_core::QueryError;
use agrotrack_core::QueryParams;
use agrotrack_core::RecordingEventSink;
use agrotrack_core::Timestamp;
use agrotrack_core::VersionCounter;

/// Cache store whose every operation fails.
struct BrokenCache;

impl CacheStore for BrokenCache {
    fn get(
        &self,
        _key: &agrotrack_core::RenderedKey,
        _now: Timestamp,
    ) -> Result<Option<serde_json::Value>, CacheError> {
        Err(CacheError::Store("backend offline".to_string()))
    }

    fn set(
        &self,
        _key: agrotrack_core::RenderedKey,
        _value: serde_json::Value,
        _policy: agrotrack_core::CachePolicy,
        _now: Timestamp,
    ) -> Result<(), CacheError> {
        Err(CacheError::Store("backend offline".to_string()))
    }

    fn remove(&self, _key: &agrotrack_core::RenderedKey) -> Result<(), CacheError> {
        Err(CacheError::Store("backend offline".to_string()))
    }
}

fn pager() -> CachedPager<MemoryCache, RecordingEventSink> {
    CachedPager::new(MemoryCache::new(), VersionCounter::new(), RecordingEventSink::new())
}

fn sample_page() -> PagedResult<u64> {
    PagedResult {
        items: vec![10, 20, 30],
        page_number: 1,
        page_size: 3,
        total_items: 3,
    }
}

fn params() -> QueryParams {
    QueryParams::new().with("page", "1").with("size", "3")
}

#[test]
fn repeat_query_skips_the_loader() {
    let pager = pager();
    let cancel = CancelToken::new();
    let now = Timestamp::Logical(0);
    let calls = Cell::new(0_u32);

    for _ in 0..3 {
        let page: PagedResult<u64> = pager
            .get_page(&EntityName::worker(), params(), now, &cancel, || {
                calls.set(calls.get() + 1);
                Ok(sample_page())
            })
            .unwrap();
        assert_eq!(page, sample_page());
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn repeat_query_emits_hit_after_first_miss() {
    let pager = pager();
    let cancel = CancelToken::new();
    let now = Timestamp::Logical(0);

    for _ in 0..2 {
        let _page: PagedResult<u64> = pager
            .get_page(&EntityName::worker(), params(), now, &cancel, || Ok(sample_page()))
            .unwrap();
    }
    let events = pager.events().recorded();
    let misses = events.iter().filter(|e| matches!(e, Event::CacheMiss { .. })).count();
    let hits = events.iter().filter(|e| matches!(e, Event::CacheHit { .. })).count();
    assert_eq!(misses, 1);
    assert_eq!(hits, 1);
}

#[test]
fn invalidation_forces_a_reload() {
    let pager = pager();
    let cancel = CancelToken::new();
    let now = Timestamp::Logical(0);
    let calls = Cell::new(0_u32);

    let load = || -> Result<PagedResult<u64>, PageError> {
        calls.set(calls.get() + 1);
        Ok(sample_page())
    };
    let _: PagedResult<u64> =
        pager.get_page(&EntityName::worker(), params(), now, &cancel, load).unwrap();
    pager.invalidate_listings(&EntityName::worker());
    let _: PagedResult<u64> = pager
        .get_page(&EntityName::worker(), params(), now, &cancel, || {
            calls.set(calls.get() + 1);
            Ok(sample_page())
        })
        .unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn invalidation_is_per_entity() {
    let pager = pager();
    let cancel = CancelToken::new();
    let now = Timestamp::Logical(0);
    let calls = Cell::new(0_u32);

    let _: PagedResult<u64> = pager
        .get_page(&EntityName::worker(), params(), now, &cancel, || {
            calls.set(calls.get() + 1);
            Ok(sample_page())
        })
        .unwrap();
    pager.invalidate_listings(&EntityName::registration());
    let _: PagedResult<u64> = pager
        .get_page(&EntityName::worker(), params(), now, &cancel, || {
            calls.set(calls.get() + 1);
            Ok(sample_page())
        })
        .unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn broken_cache_degrades_to_miss_with_correct_answer() {
    let pager =
        CachedPager::new(BrokenCache, VersionCounter::new(), RecordingEventSink::new());
    let cancel = CancelToken::new();
    let now = Timestamp::Logical(0);
    let calls = Cell::new(0_u32);

    for _ in 0..2 {
        let page: PagedResult<u64> = pager
            .get_page(&EntityName::worker(), params(), now, &cancel, || {
                calls.set(calls.get() + 1);
                Ok(sample_page())
            })
            .unwrap();
        assert_eq!(page, sample_page());
    }
    assert_eq!(calls.get(), 2);
    let degraded = pager
        .events()
        .recorded()
        .iter()
        .filter(|e| matches!(e, Event::CacheDegraded { .. }))
        .count();
    assert!(degraded >= 2);
}

#[test]
fn loader_failure_propagates_uncached() {
    let pager = pager();
    let cancel = CancelToken::new();
    let now = Timestamp::Logical(0);

    let result: Result<PagedResult<u64>, QueryError> =
        pager.get_page(&EntityName::worker(), params(), now, &cancel, || {
            Err(PageError::Source("connection reset".to_string()))
        });
    assert!(matches!(result, Err(QueryError::Page(PageError::Source(_)))));

    // The failure must not have been cached.
    let calls = Cell::new(0_u32);
    let _: PagedResult<u64> = pager
        .get_page(&EntityName::worker(), params(), now, &cancel, || {
            calls.set(calls.get() + 1);
            Ok(sample_page())
        })
        .unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn cancellation_after_load_is_not_cached() {
    let pager = pager();
    let now = Timestamp::Logical(0);

    let cancel = CancelToken::new();
    let result: Result<PagedResult<u64>, QueryError> =
        pager.get_page(&EntityName::worker(), params(), now, &cancel, || {
            cancel.cancel();
            Ok(sample_page())
        });
    assert!(matches!(result, Err(QueryError::Page(PageError::Cancelled))));

    // A fresh query must reload rather than observe a phantom entry.
    let fresh = CancelToken::new();
    let calls = Cell::new(0_u32);
    let _: PagedResult<u64> = pager
        .get_page(&EntityName::worker(), params(), now, &fresh, || {
            calls.set(calls.get() + 1);
            Ok(sample_page())
        })
        .unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn point_lookup_caches_present_records() {
    let pager = pager();
    let now = Timestamp::Logical(0);
    let calls = Cell::new(0_u32);

    for _ in 0..2 {
        let found: Option<u64> = pager
            .get_point(&EntityName::worker(), 7, now, || {
                calls.set(calls.get() + 1);
                Ok(Some(99))
            })
            .unwrap();
        assert_eq!(found, Some(99));
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn point_lookup_never_caches_absence() {
    let pager = pager();
    let now = Timestamp::Logical(0);
    let calls = Cell::new(0_u32);

    for _ in 0..2 {
        let found: Option<u64> = pager
            .get_point(&EntityName::worker(), 7, now, || {
                calls.set(calls.get() + 1);
                Ok(None)
            })
            .unwrap();
        assert_eq!(found, None);
    }
    assert_eq!(calls.get(), 2);
}

#[test]
fn entity_families_are_cached_independently() {
    use agrotrack_core::EquipmentId;
    use agrotrack_core::EquipmentRecord;

    let pager = pager();
    let cancel = CancelToken::new();
    let now = Timestamp::Logical(0);

    let tractor = EquipmentRecord {
        id: EquipmentId::new(1),
        manufacturer: "Zetor".to_string(),
        model: "Forterra".to_string(),
        serial_number: "ZF-2041".to_string(),
        type_name: "Tractor".to_string(),
    };
    let equipment_page = PagedResult {
        items: vec![tractor.clone()],
        page_number: 1,
        page_size: 10,
        total_items: 1,
    };

    let equipment_calls = Cell::new(0_u32);
    let worker_calls = Cell::new(0_u32);
    for _ in 0..2 {
        let page: PagedResult<EquipmentRecord> = pager
            .get_page(&EntityName::equipment(), params(), now, &cancel, || {
                equipment_calls.set(equipment_calls.get() + 1);
                Ok(equipment_page.clone())
            })
            .unwrap();
        assert_eq!(page.items[0], tractor);
        let _: PagedResult<u64> = pager
            .get_page(&EntityName::worker(), params(), now, &cancel, || {
                worker_calls.set(worker_calls.get() + 1);
                Ok(sample_page())
            })
            .unwrap();
    }
    assert_eq!(equipment_calls.get(), 1);
    assert_eq!(worker_calls.get(), 1);

    // Invalidating equipment leaves the worker listing cached.
    pager.invalidate_listings(&EntityName::equipment());
    let _: PagedResult<EquipmentRecord> = pager
        .get_page(&EntityName::equipment(), params(), now, &cancel, || {
            equipment_calls.set(equipment_calls.get() + 1);
            Ok(equipment_page.clone())
        })
        .unwrap();
    let _: PagedResult<u64> = pager
        .get_page(&EntityName::worker(), params(), now, &cancel, || {
            worker_calls.set(worker_calls.get() + 1);
            Ok(sample_page())
        })
        .unwrap();
    assert_eq!(equipment_calls.get(), 2);
    assert_eq!(worker_calls.get(), 1);
}

#[test]
fn remove_point_forces_a_fresh_lookup() {
    let pager = pager();
    let now = Timestamp::Logical(0);
    let calls = Cell::new(0_u32);

    let load = |value: u64| {
        let calls = &calls;
        move || {
            calls.set(calls.get() + 1);
            Ok(Some(value))
        }
    };
    let _: Option<u64> = pager.get_point(&EntityName::worker(), 7, now, load(1)).unwrap();
    pager.remove_point(&EntityName::worker(), 7);
    let fresh: Option<u64> = pager.get_point(&EntityName::worker(), 7, now, load(2)).unwrap();
    assert_eq!(fresh, Some(2));
    assert_eq!(calls.get(), 2);
}
