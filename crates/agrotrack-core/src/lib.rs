// crates/agrotrack-core/src/lib.rs
// ============================================================================
// Module: AgroTrack Core Library
// Description: Public API surface for the AgroTrack core.
// Purpose: Expose core types, interfaces, and runtime services.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! AgroTrack core provides cached pagination with version-keyed invalidation
//! and a token-based registration approval workflow for a farm-equipment
//! maintenance roster. It is backend-agnostic and integrates through explicit
//! interfaces rather than binding to a particular database, cache, mail
//! transport, or identity system.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CacheError;
pub use interfaces::CacheStore;
pub use interfaces::EventSink;
pub use interfaces::IdentityDirectory;
pub use interfaces::IdentityError;
pub use interfaces::NewIdentity;
pub use interfaces::Notification;
pub use interfaces::Notifier;
pub use interfaces::NotifyError;
pub use interfaces::PageSource;
pub use interfaces::RegistrationStore;
pub use interfaces::StoreError;
pub use interfaces::WORKER_ROLE;
pub use interfaces::WorkerStore;
pub use runtime::ApprovalConfig;
pub use runtime::ApprovalEngine;
pub use runtime::ApprovalError;
pub use runtime::CachedPager;
pub use runtime::CancelToken;
pub use runtime::DEFAULT_TOKEN_TTL;
pub use runtime::InMemoryIdentityDirectory;
pub use runtime::InMemoryRegistrationStore;
pub use runtime::InMemoryWorkerStore;
pub use runtime::LogEventSink;
pub use runtime::MemoryCache;
pub use runtime::NewWorkerAccount;
pub use runtime::NullEventSink;
pub use runtime::QueryError;
pub use runtime::RecordingEventSink;
pub use runtime::RecordingNotifier;
pub use runtime::RosterError;
pub use runtime::VersionCounter;
pub use runtime::WorkerRoster;
pub use runtime::get_page;
