// crates/agrotrack-core/src/runtime/version.rs
// ============================================================================
// Module: AgroTrack Version Counter
// Description: Monotonic per-entity generation counters for bulk invalidation.
// Purpose: Invalidate families of cached listings without enumerating keys.
// Dependencies: crate::{core, interfaces}, std
// ============================================================================

//! ## Overview
//! Each entity collection carries one strictly increasing generation
//! number. Listing cache keys embed the generation, so bumping it after a
//! write orphans every cached page for that collection at once. Counters
//! live in their own map rather than as cache entries so cache eviction
//! can never reset a generation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::EntityName;
use crate::core::Event;
use crate::interfaces::EventSink;

// ============================================================================
// SECTION: Version Counter
// ============================================================================

/// Shared, concurrency-safe per-entity generation counters.
///
/// # Invariants
/// - Generations start at 1 and only increase.
/// - Concurrent bumps never collapse: N bumps advance the counter by
///   exactly N.
#[derive(Debug, Default, Clone)]
pub struct VersionCounter {
    /// Counter map protected by a mutex.
    counters: Arc<Mutex<BTreeMap<EntityName, u64>>>,
}

impl VersionCounter {
    /// Creates an empty counter set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Returns the current generation for `entity`, initializing it to 1
    /// and persisting that initialization when absent.
    ///
    /// Never fails: a poisoned lock recovers the inner map, since a panic
    /// elsewhere cannot make a monotonic counter inconsistent.
    #[must_use]
    pub fn version(&self, entity: &EntityName) -> u64 {
        let mut guard = self.counters.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard.entry(entity.clone()).or_insert(1)
    }

    /// Atomically advances the generation for `entity` and returns the new
    /// value, emitting a [`Event::VersionBumped`] record.
    ///
    /// The increment is performed under the same lock as reads, so it is
    /// visible to every subsequent [`VersionCounter::version`] call.
    pub fn bump(&self, entity: &EntityName, events: &dyn EventSink) -> u64 {
        let version = {
            let mut guard =
                self.counters.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let slot = guard.entry(entity.clone()).or_insert(1);
            *slot += 1;
            *slot
        };
        events.emit(&Event::VersionBumped {
            entity: entity.clone(),
            version,
        });
        version
    }
}
