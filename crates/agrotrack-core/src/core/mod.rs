// crates/agrotrack-core/src/core/mod.rs
// ============================================================================
// Module: AgroTrack Core Types
// Description: Canonical AgroTrack record and key structures.
// Purpose: Provide stable, serializable types for the cache and approval flows.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! AgroTrack core types define pending registrations, worker profiles,
//! page shapes, structured cache keys, and observability events. These
//! types are the canonical source of truth for any derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cache_key;
pub mod equipment;
pub mod event;
pub mod identifiers;
pub mod page;
pub mod registration;
pub mod time;
pub mod worker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache_key::CacheKey;
pub use cache_key::CacheKeyError;
pub use cache_key::CachePolicy;
pub use cache_key::CachePriority;
pub use cache_key::QueryParams;
pub use cache_key::RenderedKey;
pub use equipment::EquipmentRecord;
pub use event::Event;
pub use identifiers::ApprovalToken;
pub use identifiers::EntityName;
pub use identifiers::EquipmentId;
pub use identifiers::RegistrationId;
pub use identifiers::UserId;
pub use identifiers::WorkerId;
pub use page::PageError;
pub use page::PageRequest;
pub use page::PagedResult;
pub use page::SortDirection;
pub use registration::DecisionAction;
pub use registration::DecisionOutcome;
pub use registration::DecisionReply;
pub use registration::NewRegistration;
pub use registration::PendingRegistration;
pub use time::Timestamp;
pub use worker::NewWorker;
pub use worker::WorkerQuery;
pub use worker::WorkerRecord;
pub use worker::WorkerSortKey;
