// crates/agrotrack-core/tests/cache_keys.rs
// ============================================================================
// Module: Cache Key Tests
// Description: Validates deterministic, collision-free cache key rendering.
// ============================================================================
//! ## Overview
//! Exercises listing and point key rendering: canonical parameter hashing,
//! version segmentation, and insertion-order independence.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use agrotrack_core::CacheKey;
use agrotrack_core::EntityName;
use agrotrack_core::QueryParams;

fn worker_params() -> QueryParams {
    QueryParams::new()
        .with("page", "2")
        .with("size", "10")
        .with("sort", "lastName")
        .with("dir", "asc")
        .with("q", "tractor")
}

#[test]
fn listing_key_is_deterministic() {
    let first = CacheKey::listing(EntityName::worker(), 3, worker_params()).render().unwrap();
    let second = CacheKey::listing(EntityName::worker(), 3, worker_params()).render().unwrap();
    assert_eq!(first, second);
}

#[test]
fn listing_key_ignores_parameter_insertion_order() {
    let forward = QueryParams::new().with("page", "1").with("q", "baler");
    let reversed = QueryParams::new().with("q", "baler").with("page", "1");
    let first = CacheKey::listing(EntityName::worker(), 1, forward).render().unwrap();
    let second = CacheKey::listing(EntityName::worker(), 1, reversed).render().unwrap();
    assert_eq!(first, second);
}

#[test]
fn listing_key_embeds_entity_and_version() {
    let key = CacheKey::listing(EntityName::worker(), 7, worker_params()).render().unwrap();
    assert!(key.as_str().starts_with("Worker/v7/"));
}

#[test]
fn version_change_yields_distinct_key() {
    let old = CacheKey::listing(EntityName::worker(), 1, worker_params()).render().unwrap();
    let new = CacheKey::listing(EntityName::worker(), 2, worker_params()).render().unwrap();
    assert_ne!(old, new);
}

#[test]
fn distinct_parameters_yield_distinct_keys() {
    let base = CacheKey::listing(EntityName::worker(), 1, worker_params()).render().unwrap();
    let other_params = worker_params().with("q", "combine");
    let other = CacheKey::listing(EntityName::worker(), 1, other_params).render().unwrap();
    assert_ne!(base, other);
}

#[test]
fn distinct_entities_yield_distinct_keys() {
    let workers = CacheKey::listing(EntityName::worker(), 1, worker_params()).render().unwrap();
    let equipment =
        CacheKey::listing(EntityName::equipment(), 1, worker_params()).render().unwrap();
    let maintenance =
        CacheKey::listing(EntityName::maintenance(), 1, worker_params()).render().unwrap();
    assert_ne!(workers, equipment);
    assert_ne!(workers, maintenance);
    assert_ne!(equipment, maintenance);
    assert!(maintenance.as_str().starts_with("Maintenance/v1/"));
}

#[test]
fn point_key_is_versionless() {
    let key = CacheKey::point(EntityName::worker(), 42).render().unwrap();
    assert_eq!(key.as_str(), "Worker/id/42");
}
