// crates/agrotrack-core/src/interfaces/mod.rs
// ============================================================================
// Module: AgroTrack Interfaces
// Description: Backend-agnostic interfaces for storage, cache, identity, and mail.
// Purpose: Define the contract surfaces used by the AgroTrack runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how AgroTrack integrates with external systems without
//! embedding backend-specific details. Expected domain outcomes (not found,
//! already processed, expired) are values, never errors; these error types
//! cover genuine backend failures. Implementations must fail closed on
//! missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ApprovalToken;
use crate::core::CachePolicy;
use crate::core::Event;
use crate::core::NewRegistration;
use crate::core::NewWorker;
use crate::core::PendingRegistration;
use crate::core::RegistrationId;
use crate::core::RenderedKey;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::core::WorkerId;
use crate::core::WorkerQuery;
use crate::core::WorkerRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Backing-store errors shared by the registration and worker stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (email, token, serial) was violated.
    #[error("duplicate entity: {0}")]
    Conflict(String),
    /// A referenced record does not exist.
    #[error("entity not found: {0}")]
    NotFound(String),
    /// The store itself failed.
    #[error("store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Cache Store
// ============================================================================

/// Cache store errors.
///
/// The query facade treats any cache error as a miss; caching is an
/// optimization, never a correctness dependency.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache backend failed.
    #[error("cache store error: {0}")]
    Store(String),
}

/// Process-local key/value cache with per-entry expiration policies.
///
/// Entries are JSON snapshots so one cache serves every entity type.
/// Implementations evaluate sliding and absolute windows against the
/// caller-supplied `now`; the core never reads wall-clock time.
pub trait CacheStore {
    /// Returns the entry for `key` when present and unexpired, renewing
    /// its sliding window.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    fn get(&self, key: &RenderedKey, now: Timestamp)
    -> Result<Option<serde_json::Value>, CacheError>;

    /// Stores an entry under `key` with the given expiration policy.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    fn set(
        &self,
        key: RenderedKey,
        value: serde_json::Value,
        policy: CachePolicy,
        now: Timestamp,
    ) -> Result<(), CacheError>;

    /// Removes the entry for `key` when present.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    fn remove(&self, key: &RenderedKey) -> Result<(), CacheError>;
}

// ============================================================================
// SECTION: Page Source
// ============================================================================

/// Counted, fetchable view over an ordered, filtered collection.
///
/// This is the seam between the paged query executor and any backing
/// store. Implementations must apply their filter before counting and
/// must order deterministically, breaking ties by record identity.
pub trait PageSource<T> {
    /// Returns the total item count of the filtered collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing query fails.
    fn count(&self) -> Result<u64, StoreError>;

    /// Fetches up to `take` items after skipping `skip`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing query fails.
    fn fetch(&self, skip: u64, take: u64) -> Result<Vec<T>, StoreError>;
}

// ============================================================================
// SECTION: Registration Store
// ============================================================================

/// Persistent store for the pending registration set.
///
/// The `claim`/`release` pair implements the optimistic check-and-set on
/// `is_processed` that serializes concurrent decisions on one
/// registration.
pub trait RegistrationStore {
    /// Creates a pending registration with the supplied token and expiry,
    /// assigning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the email or token already
    /// exists in the pending set.
    fn create(
        &self,
        registration: &NewRegistration,
        token: &ApprovalToken,
        requested_at: Timestamp,
        token_expires_at: Timestamp,
    ) -> Result<PendingRegistration, StoreError>;

    /// Finds the unprocessed registration carrying `token`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing query fails.
    fn find_by_token(
        &self,
        token: &ApprovalToken,
    ) -> Result<Option<PendingRegistration>, StoreError>;

    /// Finds the unprocessed registration with identifier `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing query fails.
    fn find_by_id(&self, id: RegistrationId) -> Result<Option<PendingRegistration>, StoreError>;

    /// Lists unprocessed registrations ordered by request time, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing query fails.
    fn list_pending(&self) -> Result<Vec<PendingRegistration>, StoreError>;

    /// Atomically marks the registration processed.
    ///
    /// Returns `true` when this call performed the transition and `false`
    /// when the registration was already processed or absent. Exactly one
    /// of any set of concurrent claims succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing write fails.
    fn claim(&self, id: RegistrationId) -> Result<bool, StoreError>;

    /// Rolls back a claim after a downstream failure, restoring the
    /// registration to the pending set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing write fails.
    fn release(&self, id: RegistrationId) -> Result<(), StoreError>;

    /// Removes the registration; the authoritative terminal action.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing write fails.
    fn remove(&self, id: RegistrationId) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Worker Store
// ============================================================================

/// Persistent store for worker profiles.
pub trait WorkerStore {
    /// Inserts a worker profile, assigning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the email already exists.
    fn insert(&self, worker: &NewWorker) -> Result<WorkerId, StoreError>;

    /// Returns the worker with identifier `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing query fails.
    fn find(&self, id: WorkerId) -> Result<Option<WorkerRecord>, StoreError>;

    /// Replaces the stored record for `worker.id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such worker exists.
    fn update(&self, worker: &WorkerRecord) -> Result<(), StoreError>;

    /// Deletes the worker with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such worker exists.
    fn delete(&self, id: WorkerId) -> Result<(), StoreError>;

    /// Returns the filtered count for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing query fails.
    fn count(&self, query: &WorkerQuery) -> Result<u64, StoreError>;

    /// Fetches an ordered window of the filtered roster.
    ///
    /// Ordering follows the query's sort key and direction with worker id
    /// as the tie-break.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing query fails.
    fn fetch(&self, query: &WorkerQuery, skip: u64, take: u64)
    -> Result<Vec<WorkerRecord>, StoreError>;
}

// ============================================================================
// SECTION: Identity Directory
// ============================================================================

/// Fixed role grouping assigned to approved workers.
pub const WORKER_ROLE: &str = "Worker";

/// Identity-creation errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// An identity with this email already exists.
    #[error("identity already exists for {0}")]
    Duplicate(String),
    /// The directory rejected the identity with structured reasons.
    #[error("identity creation rejected: {0}")]
    Rejected(String),
    /// The directory itself failed.
    #[error("identity directory error: {0}")]
    Directory(String),
}

/// Profile and credential fields for a new login identity.
///
/// # Invariants
/// - `password_hash` is pre-computed; directories must store it verbatim
///   and never re-hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdentity {
    /// Login email; unique across the directory.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Pre-computed credential hash.
    pub password_hash: String,
    /// Role grouping for the identity.
    pub role: String,
}

/// Capability to create and remove loginable accounts.
pub trait IdentityDirectory {
    /// Creates a loginable identity and returns its unique identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when creation fails; no partial identity
    /// may remain.
    fn create_identity(&self, identity: &NewIdentity) -> Result<UserId, IdentityError>;

    /// Removes an identity; used to compensate when the paired worker
    /// profile cannot be created.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when removal fails.
    fn remove_identity(&self, user_id: &UserId) -> Result<(), IdentityError>;
}

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The transport failed to accept or deliver the message.
    #[error("notification transport error: {0}")]
    Transport(String),
}

/// An email-like message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Recipient address.
    pub recipient: String,
    /// Message subject.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Capability to send an email-like message.
///
/// Failure reporting only; no delivery guarantee is required of the core.
pub trait Notifier {
    /// Sends a message to its recipient.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the transport fails.
    fn send(&self, message: &Notification) -> Result<(), NotifyError>;
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Receiver for structured observability events.
///
/// Sinks are advisory and must never fail the emitting operation.
pub trait EventSink {
    /// Records an event.
    fn emit(&self, event: &Event);
}
