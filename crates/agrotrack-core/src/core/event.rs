// crates/agrotrack-core/src/core/event.rs
// ============================================================================
// Module: AgroTrack Observability Events
// Description: Structured event records for cache, version, and approval flow.
// Purpose: Give hosts audit-grade visibility without a hard logging dependency.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! AgroTrack reports observability through structured event values emitted
//! to an [`EventSink`](crate::interfaces::EventSink). Events are
//! advisory: sinks must never fail the operation that emitted them, and no
//! correctness property depends on an event being recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EntityName;
use crate::core::identifiers::RegistrationId;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Structured observability event.
///
/// # Invariants
/// - Variants are stable for serialization; events never carry credential
///   material or token values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A listing or point lookup was answered from cache.
    CacheHit {
        /// Rendered cache key.
        key: String,
    },
    /// A lookup missed and the loader ran.
    CacheMiss {
        /// Rendered cache key.
        key: String,
    },
    /// The cache store failed and the facade degraded to a miss.
    CacheDegraded {
        /// Failure description.
        reason: String,
    },
    /// An entity generation counter advanced.
    VersionBumped {
        /// Entity collection name.
        entity: EntityName,
        /// New generation value.
        version: u64,
    },
    /// A sign-up entered the pending set.
    RegistrationSubmitted {
        /// Registration identifier.
        id: RegistrationId,
        /// Applicant email.
        email: String,
    },
    /// A registration was approved and the worker account created.
    RegistrationApproved {
        /// Registration identifier.
        id: RegistrationId,
        /// Applicant email.
        email: String,
    },
    /// A registration was rejected and removed from the pending set.
    RegistrationRejected {
        /// Registration identifier.
        id: RegistrationId,
        /// Applicant email.
        email: String,
    },
    /// A processed registration could not be removed from the store; the
    /// decision stands and the held claim keeps the row out of pending
    /// lookups.
    RegistrationCleanupFailed {
        /// Registration identifier.
        id: RegistrationId,
        /// Failure description.
        reason: String,
    },
    /// A notification could not be delivered; the decision stands.
    NotificationFailed {
        /// Intended recipient.
        recipient: String,
        /// Failure description.
        reason: String,
    },
}
