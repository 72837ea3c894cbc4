// crates/agrotrack-core/src/runtime/store.rs
// ============================================================================
// Module: AgroTrack In-Memory Stores
// Description: In-memory cache, stores, directory, and notifier adapters.
// Purpose: Provide deterministic implementations for tests and demos.
// Dependencies: crate::{core, interfaces}, serde_json, std
// ============================================================================

//! ## Overview
//! This module provides simple in-memory implementations of the AgroTrack
//! interfaces for tests and local demos. They are deterministic, safe for
//! concurrent use, and not intended for production.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::ApprovalToken;
use crate::core::CachePolicy;
use crate::core::CachePriority;
use crate::core::NewRegistration;
use crate::core::NewWorker;
use crate::core::PendingRegistration;
use crate::core::RegistrationId;
use crate::core::RenderedKey;
use crate::core::SortDirection;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::core::WorkerId;
use crate::core::WorkerQuery;
use crate::core::WorkerRecord;
use crate::core::WorkerSortKey;
use crate::interfaces::CacheError;
use crate::interfaces::CacheStore;
use crate::interfaces::IdentityDirectory;
use crate::interfaces::IdentityError;
use crate::interfaces::NewIdentity;
use crate::interfaces::Notification;
use crate::interfaces::Notifier;
use crate::interfaces::NotifyError;
use crate::interfaces::RegistrationStore;
use crate::interfaces::StoreError;
use crate::interfaces::WorkerStore;

// ============================================================================
// SECTION: Memory Cache
// ============================================================================

/// A stored cache entry with its expiry bookkeeping.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Cached JSON snapshot.
    value: serde_json::Value,
    /// Insertion time, anchor for the absolute ceiling.
    inserted_at: Timestamp,
    /// Last read time, anchor for the sliding window.
    last_access: Timestamp,
    /// Expiration policy for the entry.
    policy: CachePolicy,
}

impl CacheEntry {
    /// Returns true once either expiry window has passed at `now`.
    ///
    /// Incomparable timestamp kinds never expire an entry; hosts supply a
    /// single kind throughout a deployment.
    fn expired(&self, now: Timestamp) -> bool {
        let absolute_hit = match self.policy.absolute {
            Some(window) => now.since(&self.inserted_at).is_some_and(|age| age > window),
            None => false,
        };
        let sliding_hit = match self.policy.sliding {
            Some(window) => now.since(&self.last_access).is_some_and(|idle| idle > window),
            None => false,
        };
        absolute_hit || sliding_hit
    }
}

/// Process-local in-memory cache with sliding and absolute expiry.
///
/// # Invariants
/// - Expiry is evaluated against caller-supplied time only.
/// - When full, the lowest-priority entries are evicted first;
///   [`CachePriority::NeverRemove`] entries are never pressure-evicted.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    /// Entry map protected by a mutex.
    entries: Arc<Mutex<BTreeMap<RenderedKey, CacheEntry>>>,
    /// Optional maximum entry count before pressure eviction.
    max_entries: Option<usize>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Creates an unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            max_entries: None,
        }
    }

    /// Creates a cache that pressure-evicts beyond `max_entries`.
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            max_entries: Some(max_entries),
        }
    }

    /// Returns the live entry count.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the lock is poisoned.
    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.len())
    }

    /// Returns true when the cache holds no entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.lock()?.is_empty())
    }

    /// Locks the entry map.
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<RenderedKey, CacheEntry>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::Store("cache mutex poisoned".to_string()))
    }

    /// Evicts one lowest-priority entry to make room, skipping
    /// `NeverRemove` entries.
    fn evict_one(entries: &mut BTreeMap<RenderedKey, CacheEntry>) {
        let victim = entries
            .iter()
            .filter(|(_, entry)| entry.policy.priority != CachePriority::NeverRemove)
            .min_by_key(|(_, entry)| match entry.policy.priority {
                CachePriority::Low => 0_u8,
                CachePriority::Normal => 1,
                CachePriority::NeverRemove => 2,
            })
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            entries.remove(&key);
        }
    }
}

impl CacheStore for MemoryCache {
    fn get(
        &self,
        key: &RenderedKey,
        now: Timestamp,
    ) -> Result<Option<serde_json::Value>, CacheError> {
        let mut guard = self.lock()?;
        let Some(entry) = guard.get_mut(key) else {
            return Ok(None);
        };
        if entry.expired(now) {
            guard.remove(key);
            return Ok(None);
        }
        entry.last_access = now;
        Ok(Some(entry.value.clone()))
    }

    fn set(
        &self,
        key: RenderedKey,
        value: serde_json::Value,
        policy: CachePolicy,
        now: Timestamp,
    ) -> Result<(), CacheError> {
        let mut guard = self.lock()?;
        if let Some(max) = self.max_entries
            && !guard.contains_key(&key)
            && guard.len() >= max
        {
            Self::evict_one(&mut guard);
        }
        guard.insert(key, CacheEntry {
            value,
            inserted_at: now,
            last_access: now,
            policy,
        });
        Ok(())
    }

    fn remove(&self, key: &RenderedKey) -> Result<(), CacheError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Registration Store
// ============================================================================

/// In-memory pending registration store for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistrationStore {
    /// Registration map protected by a mutex, keyed by raw id.
    inner: Arc<Mutex<RegistrationState>>,
}

/// Mutable state behind the registration store lock.
#[derive(Debug, Default)]
struct RegistrationState {
    /// Registrations by raw identifier.
    rows: BTreeMap<u64, PendingRegistration>,
    /// Next identifier to assign.
    next_id: u64,
}

impl InMemoryRegistrationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, RegistrationState>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Store("registration store mutex poisoned".to_string()))
    }
}

impl RegistrationStore for InMemoryRegistrationStore {
    fn create(
        &self,
        registration: &NewRegistration,
        token: &ApprovalToken,
        requested_at: Timestamp,
        token_expires_at: Timestamp,
    ) -> Result<PendingRegistration, StoreError> {
        let mut guard = self.lock()?;
        let duplicate = guard.rows.values().any(|row| {
            !row.is_processed && row.email.eq_ignore_ascii_case(&registration.email)
        });
        if duplicate {
            return Err(StoreError::Conflict(registration.email.clone()));
        }
        guard.next_id += 1;
        let row = PendingRegistration {
            id: RegistrationId::new(guard.next_id),
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            email: registration.email.clone(),
            phone_number: registration.phone_number.clone(),
            position: registration.position.clone(),
            password_hash: registration.password_hash.clone(),
            requested_at,
            approval_token: token.clone(),
            token_expires_at,
            is_processed: false,
        };
        guard.rows.insert(row.id.get(), row.clone());
        Ok(row)
    }

    fn find_by_token(
        &self,
        token: &ApprovalToken,
    ) -> Result<Option<PendingRegistration>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .rows
            .values()
            .find(|row| !row.is_processed && row.approval_token == *token)
            .cloned())
    }

    fn find_by_id(&self, id: RegistrationId) -> Result<Option<PendingRegistration>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.rows.get(&id.get()).filter(|row| !row.is_processed).cloned())
    }

    fn list_pending(&self) -> Result<Vec<PendingRegistration>, StoreError> {
        let guard = self.lock()?;
        let mut pending: Vec<PendingRegistration> =
            guard.rows.values().filter(|row| !row.is_processed).cloned().collect();
        pending.sort_by(|a, b| {
            timestamp_order(b.requested_at)
                .cmp(&timestamp_order(a.requested_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(pending)
    }

    fn claim(&self, id: RegistrationId) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        match guard.rows.get_mut(&id.get()) {
            Some(row) if !row.is_processed => {
                row.is_processed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn release(&self, id: RegistrationId) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        match guard.rows.get_mut(&id.get()) {
            Some(row) => {
                row.is_processed = false;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("registration {id}"))),
        }
    }

    fn remove(&self, id: RegistrationId) -> Result<(), StoreError> {
        self.lock()?.rows.remove(&id.get());
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Worker Store
// ============================================================================

/// In-memory worker profile store for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWorkerStore {
    /// Worker map protected by a mutex.
    inner: Arc<Mutex<WorkerState>>,
}

/// Mutable state behind the worker store lock.
#[derive(Debug, Default)]
struct WorkerState {
    /// Workers by raw identifier.
    rows: BTreeMap<u64, WorkerRecord>,
    /// Next identifier to assign.
    next_id: u64,
}

impl InMemoryWorkerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, WorkerState>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Store("worker store mutex poisoned".to_string()))
    }

    /// Returns the filtered, ordered roster for `query`.
    fn matching(&self, query: &WorkerQuery) -> Result<Vec<WorkerRecord>, StoreError> {
        let guard = self.lock()?;
        let mut rows: Vec<WorkerRecord> = guard
            .rows
            .values()
            .filter(|row| matches_search(row, query.search.as_deref()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_workers(a, b, query.sort_key, query.direction));
        Ok(rows)
    }
}

impl WorkerStore for InMemoryWorkerStore {
    fn insert(&self, worker: &NewWorker) -> Result<WorkerId, StoreError> {
        let mut guard = self.lock()?;
        let duplicate =
            guard.rows.values().any(|row| row.email.eq_ignore_ascii_case(&worker.email));
        if duplicate {
            return Err(StoreError::Conflict(worker.email.clone()));
        }
        guard.next_id += 1;
        let id = WorkerId::new(guard.next_id);
        guard.rows.insert(id.get(), WorkerRecord {
            id,
            first_name: worker.first_name.clone(),
            last_name: worker.last_name.clone(),
            email: worker.email.clone(),
            phone_number: worker.phone_number.clone(),
            position: worker.position.clone(),
            user_id: worker.user_id.clone(),
        });
        Ok(id)
    }

    fn find(&self, id: WorkerId) -> Result<Option<WorkerRecord>, StoreError> {
        Ok(self.lock()?.rows.get(&id.get()).cloned())
    }

    fn update(&self, worker: &WorkerRecord) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        match guard.rows.get_mut(&worker.id.get()) {
            Some(row) => {
                *row = worker.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("worker {}", worker.id))),
        }
    }

    fn delete(&self, id: WorkerId) -> Result<(), StoreError> {
        match self.lock()?.rows.remove(&id.get()) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!("worker {id}"))),
        }
    }

    fn count(&self, query: &WorkerQuery) -> Result<u64, StoreError> {
        Ok(self.matching(query)?.len() as u64)
    }

    fn fetch(
        &self,
        query: &WorkerQuery,
        skip: u64,
        take: u64,
    ) -> Result<Vec<WorkerRecord>, StoreError> {
        let skip = usize::try_from(skip).map_err(|err| StoreError::Store(err.to_string()))?;
        let take = usize::try_from(take).map_err(|err| StoreError::Store(err.to_string()))?;
        Ok(self.matching(query)?.into_iter().skip(skip).take(take).collect())
    }
}

/// Returns true when `row` matches the case-insensitive search term.
fn matches_search(row: &WorkerRecord, search: Option<&str>) -> bool {
    let Some(term) = search else {
        return true;
    };
    let term = term.to_lowercase();
    row.first_name.to_lowercase().contains(&term)
        || row.last_name.to_lowercase().contains(&term)
        || row.email.to_lowercase().contains(&term)
        || row.position.as_deref().is_some_and(|p| p.to_lowercase().contains(&term))
}

/// Orders two workers by the sort key and direction, breaking ties by id.
fn compare_workers(
    a: &WorkerRecord,
    b: &WorkerRecord,
    key: WorkerSortKey,
    direction: SortDirection,
) -> Ordering {
    let keyed = match key {
        WorkerSortKey::Id => a.id.cmp(&b.id),
        WorkerSortKey::FirstName => a.first_name.cmp(&b.first_name),
        WorkerSortKey::LastName => a.last_name.cmp(&b.last_name),
        WorkerSortKey::Email => a.email.cmp(&b.email),
        WorkerSortKey::Position => a.position.cmp(&b.position),
    };
    let directed = match direction {
        SortDirection::Ascending => keyed,
        SortDirection::Descending => keyed.reverse(),
    };
    directed.then_with(|| a.id.cmp(&b.id))
}

/// Maps a timestamp to a sortable scalar within one kind.
const fn timestamp_order(value: Timestamp) -> i128 {
    match value {
        Timestamp::UnixMillis(millis) => millis as i128,
        Timestamp::Logical(tick) => tick as i128,
    }
}

// ============================================================================
// SECTION: In-Memory Identity Directory
// ============================================================================

/// In-memory identity directory for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityDirectory {
    /// Identity map protected by a mutex.
    inner: Arc<Mutex<IdentityState>>,
}

/// Mutable state behind the directory lock.
#[derive(Debug, Default)]
struct IdentityState {
    /// Identities by user id string.
    rows: BTreeMap<String, NewIdentity>,
    /// Next identifier to assign.
    next_id: u64,
}

impl InMemoryIdentityDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored identities.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the lock is poisoned.
    pub fn identity_count(&self) -> Result<usize, IdentityError> {
        Ok(self.lock()?.rows.len())
    }

    /// Returns true when an identity exists for `email`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the lock is poisoned.
    pub fn contains_email(&self, email: &str) -> Result<bool, IdentityError> {
        Ok(self.lock()?.rows.values().any(|row| row.email.eq_ignore_ascii_case(email)))
    }

    /// Locks the directory state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, IdentityState>, IdentityError> {
        self.inner
            .lock()
            .map_err(|_| IdentityError::Directory("identity directory mutex poisoned".to_string()))
    }
}

impl IdentityDirectory for InMemoryIdentityDirectory {
    fn create_identity(&self, identity: &NewIdentity) -> Result<UserId, IdentityError> {
        let mut guard = self.lock()?;
        let duplicate = guard.rows.values().any(|row| row.email.eq_ignore_ascii_case(&identity.email));
        if duplicate {
            return Err(IdentityError::Duplicate(identity.email.clone()));
        }
        guard.next_id += 1;
        let user_id = format!("user-{}", guard.next_id);
        guard.rows.insert(user_id.clone(), identity.clone());
        Ok(UserId::new(user_id))
    }

    fn remove_identity(&self, user_id: &UserId) -> Result<(), IdentityError> {
        let mut guard = self.lock()?;
        match guard.rows.remove(user_id.as_str()) {
            Some(_) => Ok(()),
            None => Err(IdentityError::Directory(format!("unknown identity {user_id}"))),
        }
    }
}

// ============================================================================
// SECTION: Recording Notifier
// ============================================================================

/// Notifier that records messages, optionally failing every send.
///
/// Failed sends are still recorded, so tests can assert on attempts.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    /// Sent messages protected by a mutex.
    sent: Arc<Mutex<Vec<Notification>>>,
    /// When true, every send reports a transport failure.
    fail: bool,
}

impl RecordingNotifier {
    /// Creates a notifier whose sends succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier whose sends all fail after recording.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// Returns a snapshot of the recorded messages.
    #[must_use]
    pub fn messages(&self) -> Vec<Notification> {
        self.sent.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, message: &Notification) -> Result<(), NotifyError> {
        if let Ok(mut guard) = self.sent.lock() {
            guard.push(message.clone());
        }
        if self.fail {
            return Err(NotifyError::Transport("simulated outage".to_string()));
        }
        Ok(())
    }
}
