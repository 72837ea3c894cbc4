// crates/agrotrack-core/src/runtime/cache.rs
// ============================================================================
// Module: AgroTrack Cache-Aware Query Facade
// Description: Read-through caching keyed by entity generation and query params.
// Purpose: Answer paged queries from cache and invalidate by version bump.
// Dependencies: crate::{core, interfaces, runtime}, serde, serde_json
// ============================================================================

//! ## Overview
//! The facade composes the version counter, the paged query executor, and
//! a cache store. Listing entries are keyed by entity generation plus
//! every query parameter, so a version bump orphans a whole family while
//! distinct filters never collide. Point lookups use their own
//! un-versioned family invalidated by direct removal. Cache failures
//! degrade to a miss; a failed or cancelled load is never cached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::CacheKey;
use crate::core::CacheKeyError;
use crate::core::CachePolicy;
use crate::core::EntityName;
use crate::core::Event;
use crate::core::PageError;
use crate::core::PagedResult;
use crate::core::QueryParams;
use crate::core::Timestamp;
use crate::interfaces::CacheStore;
use crate::interfaces::EventSink;
use crate::interfaces::StoreError;
use crate::runtime::pager::CancelToken;
use crate::runtime::version::VersionCounter;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced by the cache-aware query facade.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The underlying page load failed or was cancelled.
    #[error(transparent)]
    Page(#[from] PageError),
    /// A cache key could not be rendered.
    #[error(transparent)]
    Key(#[from] CacheKeyError),
    /// A point-lookup load failed.
    #[error("point lookup error: {0}")]
    Point(String),
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        Self::Point(err.to_string())
    }
}

// ============================================================================
// SECTION: Facade
// ============================================================================

/// Cache-aware query facade over a [`CacheStore`] and a [`VersionCounter`].
///
/// # Invariants
/// - A cache hit returns the stored snapshot without invoking the loader.
/// - Nothing is cached for a failed or cancelled load.
/// - Listing and point families are invalidated independently: version
///   bump for listings, direct removal for points. Both are required.
pub struct CachedPager<C, E> {
    /// Cache store backend.
    cache: C,
    /// Shared per-entity generation counters.
    versions: VersionCounter,
    /// Observability sink.
    events: E,
    /// Expiration policy for listing entries.
    listing_policy: CachePolicy,
    /// Expiration policy for point entries.
    point_policy: CachePolicy,
}

impl<C: CacheStore, E: EventSink> CachedPager<C, E> {
    /// Creates a facade with the default listing and point policies.
    #[must_use]
    pub fn new(cache: C, versions: VersionCounter, events: E) -> Self {
        Self {
            cache,
            versions,
            events,
            listing_policy: CachePolicy::listing_default(),
            point_policy: CachePolicy::point_default(),
        }
    }

    /// Overrides both expiration policies.
    #[must_use]
    pub fn with_policies(mut self, listing: CachePolicy, point: CachePolicy) -> Self {
        self.listing_policy = listing;
        self.point_policy = point;
        self
    }

    /// Returns the shared version counter handle.
    #[must_use]
    pub const fn versions(&self) -> &VersionCounter {
        &self.versions
    }

    /// Answers a paged listing query read-through.
    ///
    /// The key is built from the current entity generation plus all query
    /// parameters. On a hit the loader never runs; on a miss the loader's
    /// result is stored under the key and returned.
    ///
    /// # Errors
    ///
    /// Propagates loader failures ([`QueryError::Page`]); cache-store
    /// failures are not errors and degrade to a miss.
    pub fn get_page<T, F>(
        &self,
        entity: &EntityName,
        params: QueryParams,
        now: Timestamp,
        cancel: &CancelToken,
        loader: F,
    ) -> Result<PagedResult<T>, QueryError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<PagedResult<T>, PageError>,
    {
        let version = self.versions.version(entity);
        let key = CacheKey::listing(entity.clone(), version, params).render()?;

        match self.cache.get(&key, now) {
            Ok(Some(snapshot)) => {
                if let Ok(page) = PagedResult::from_snapshot(snapshot) {
                    self.events.emit(&Event::CacheHit {
                        key: key.as_str().to_string(),
                    });
                    return Ok(page);
                }
                // Unreadable snapshot: fall through and reload.
            }
            Ok(None) => {}
            Err(err) => self.events.emit(&Event::CacheDegraded {
                reason: err.to_string(),
            }),
        }

        self.events.emit(&Event::CacheMiss {
            key: key.as_str().to_string(),
        });

        let page = loader()?;
        if cancel.is_cancelled() {
            return Err(QueryError::Page(PageError::Cancelled));
        }
        if let Ok(snapshot) = page.to_snapshot()
            && let Err(err) = self.cache.set(key, snapshot, self.listing_policy, now)
        {
            self.events.emit(&Event::CacheDegraded {
                reason: err.to_string(),
            });
        }
        Ok(page)
    }

    /// Answers a single-record lookup read-through against the
    /// un-versioned point family.
    ///
    /// Only present records are cached; an absent record is reported as
    /// `None` without creating an entry.
    ///
    /// # Errors
    ///
    /// Propagates loader failures as [`QueryError::Point`].
    pub fn get_point<T, F>(
        &self,
        entity: &EntityName,
        record_id: u64,
        now: Timestamp,
        loader: F,
    ) -> Result<Option<T>, QueryError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<Option<T>, StoreError>,
    {
        let key = CacheKey::point(entity.clone(), record_id).render()?;

        match self.cache.get(&key, now) {
            Ok(Some(snapshot)) => {
                if let Ok(record) = serde_json::from_value(snapshot) {
                    self.events.emit(&Event::CacheHit {
                        key: key.as_str().to_string(),
                    });
                    return Ok(Some(record));
                }
            }
            Ok(None) => {}
            Err(err) => self.events.emit(&Event::CacheDegraded {
                reason: err.to_string(),
            }),
        }

        self.events.emit(&Event::CacheMiss {
            key: key.as_str().to_string(),
        });

        let record = loader()?;
        if let Some(found) = &record
            && let Ok(snapshot) = serde_json::to_value(found)
            && let Err(err) = self.cache.set(key, snapshot, self.point_policy, now)
        {
            self.events.emit(&Event::CacheDegraded {
                reason: err.to_string(),
            });
        }
        Ok(record)
    }

    /// Invalidates every cached listing for `entity` by advancing its
    /// generation. Called by writers after a create, update, or delete
    /// commits.
    pub fn invalidate_listings(&self, entity: &EntityName) -> u64 {
        self.versions.bump(entity, &self.events)
    }

    /// Removes the point entry for one record. Called by writers alongside
    /// the version bump for updates and deletes; the two mechanisms are
    /// independent and both required.
    pub fn remove_point(&self, entity: &EntityName, record_id: u64) {
        if let Ok(key) = CacheKey::point(entity.clone(), record_id).render()
            && let Err(err) = self.cache.remove(&key)
        {
            self.events.emit(&Event::CacheDegraded {
                reason: err.to_string(),
            });
        }
    }

    /// Returns the observability sink.
    pub const fn events(&self) -> &E {
        &self.events
    }
}
