// crates/agrotrack-core/src/runtime/roster.rs
// ============================================================================
// Module: AgroTrack Worker Roster
// Description: Cached worker listing, lookup, and account maintenance.
// Purpose: Consume the query facade the way presentation layers do.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The roster service answers worker listings through the cache-aware
//! facade, resolving caller sort input against the closed key set, and
//! performs writes that drive both invalidation mechanisms: a version
//! bump for listing caches and direct point-key removal for single-record
//! caches.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::EntityName;
use crate::core::NewWorker;
use crate::core::PageRequest;
use crate::core::PagedResult;
use crate::core::QueryParams;
use crate::core::Timestamp;
use crate::core::WorkerId;
use crate::core::WorkerQuery;
use crate::core::WorkerRecord;
use crate::interfaces::CacheStore;
use crate::interfaces::EventSink;
use crate::interfaces::IdentityDirectory;
use crate::interfaces::IdentityError;
use crate::interfaces::NewIdentity;
use crate::interfaces::PageSource;
use crate::interfaces::StoreError;
use crate::interfaces::WORKER_ROLE;
use crate::interfaces::WorkerStore;
use crate::runtime::cache::CachedPager;
use crate::runtime::cache::QueryError;
use crate::runtime::pager;
use crate::runtime::pager::CancelToken;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Upstream failures surfaced by roster writes.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Backing store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Identity directory failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

// ============================================================================
// SECTION: New Accounts
// ============================================================================

/// Fields for an administrator-created worker account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkerAccount {
    /// Worker first name.
    pub first_name: String,
    /// Worker last name.
    pub last_name: String,
    /// Worker email.
    pub email: String,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Optional position.
    pub position: Option<String>,
    /// Pre-computed credential hash.
    pub password_hash: String,
}

// ============================================================================
// SECTION: Page Source Adapter
// ============================================================================

/// Adapter exposing one worker query as a [`PageSource`].
struct WorkerPageSource<'a, W> {
    /// Backing worker store.
    store: &'a W,
    /// Filter and ordering parameters.
    query: &'a WorkerQuery,
}

impl<W: WorkerStore> PageSource<WorkerRecord> for WorkerPageSource<'_, W> {
    fn count(&self) -> Result<u64, StoreError> {
        self.store.count(self.query)
    }

    fn fetch(&self, skip: u64, take: u64) -> Result<Vec<WorkerRecord>, StoreError> {
        self.store.fetch(self.query, skip, take)
    }
}

// ============================================================================
// SECTION: Roster Service
// ============================================================================

/// Worker roster service over a store, an identity directory, and the
/// cache-aware query facade.
pub struct WorkerRoster<W, I, C, E> {
    /// Worker profile store.
    store: W,
    /// Login identity directory.
    identities: I,
    /// Cache-aware query facade.
    pager: CachedPager<C, E>,
}

impl<W, I, C, E> WorkerRoster<W, I, C, E>
where
    W: WorkerStore,
    I: IdentityDirectory,
    C: CacheStore,
    E: EventSink,
{
    /// Creates a roster service.
    #[must_use]
    pub const fn new(store: W, identities: I, pager: CachedPager<C, E>) -> Self {
        Self {
            store,
            identities,
            pager,
        }
    }

    /// Returns the facade, for wiring writers that share its counters.
    #[must_use]
    pub const fn pager(&self) -> &CachedPager<C, E> {
        &self.pager
    }

    /// Lists a page of the roster, read-through cached.
    ///
    /// Raw sort input resolves against the closed key set with the
    /// documented fallback; all parameters, including the resolved sort
    /// and search, are part of the cache key.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] for malformed page coordinates, cancelled
    /// queries, or backing-store failures.
    pub fn list(
        &self,
        page_number: u64,
        page_size: u64,
        sort_by: Option<&str>,
        sort_dir: Option<&str>,
        search: Option<&str>,
        now: Timestamp,
        cancel: &CancelToken,
    ) -> Result<PagedResult<WorkerRecord>, QueryError> {
        let request = PageRequest::new(page_number, page_size)?;
        let query = WorkerQuery::from_raw(search, sort_by, sort_dir);

        let params = QueryParams::new()
            .with("page", page_number.to_string())
            .with("size", page_size.to_string())
            .with("sort", query.sort_key.as_str())
            .with("dir", query.direction.as_str())
            .with("q", query.search.clone().unwrap_or_default());

        let source = WorkerPageSource {
            store: &self.store,
            query: &query,
        };
        self.pager.get_page(&EntityName::worker(), params, now, cancel, || {
            pager::get_page(&source, request, cancel)
        })
    }

    /// Looks up one worker, read-through cached in the point family.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Point`] when the backing lookup fails.
    pub fn get(
        &self,
        id: WorkerId,
        now: Timestamp,
    ) -> Result<Option<WorkerRecord>, QueryError> {
        self.pager.get_point(&EntityName::worker(), id.get(), now, || self.store.find(id))
    }

    /// Creates a worker account: login identity plus linked profile.
    ///
    /// The two creations form one logical unit; a profile failure removes
    /// the just-created identity. On success the worker listing caches
    /// are invalidated by version bump.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Duplicate`] (wrapped) when the email is
    /// taken, and store errors when persistence fails.
    pub fn create(&self, account: &NewWorkerAccount) -> Result<WorkerId, RosterError> {
        let user_id = self.identities.create_identity(&NewIdentity {
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            password_hash: account.password_hash.clone(),
            role: WORKER_ROLE.to_string(),
        })?;

        let profile = NewWorker {
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
            phone_number: account.phone_number.clone(),
            position: account.position.clone(),
            user_id: user_id.clone(),
        };
        let worker_id = match self.store.insert(&profile) {
            Ok(worker_id) => worker_id,
            Err(err) => {
                if let Err(cleanup) = self.identities.remove_identity(&user_id) {
                    return Err(RosterError::Store(StoreError::Store(format!(
                        "worker insert failed ({err}); identity cleanup failed ({cleanup})"
                    ))));
                }
                return Err(RosterError::Store(err));
            }
        };

        self.pager.invalidate_listings(&EntityName::worker());
        Ok(worker_id)
    }

    /// Updates a worker profile, invalidating both cache families.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] (wrapped) when no such worker
    /// exists.
    pub fn update(&self, worker: &WorkerRecord) -> Result<(), RosterError> {
        self.store.update(worker)?;
        self.pager.invalidate_listings(&EntityName::worker());
        self.pager.remove_point(&EntityName::worker(), worker.id.get());
        Ok(())
    }

    /// Deletes a worker profile, invalidating both cache families.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] (wrapped) when no such worker
    /// exists.
    pub fn delete(&self, id: WorkerId) -> Result<(), RosterError> {
        self.store.delete(id)?;
        self.pager.invalidate_listings(&EntityName::worker());
        self.pager.remove_point(&EntityName::worker(), id.get());
        Ok(())
    }
}
