// crates/agrotrack-core/src/runtime/mod.rs
// ============================================================================
// Module: AgroTrack Runtime
// Description: Version counters, pager, cache facade, approval engine, roster.
// Purpose: Compose the core types and interfaces into the working services.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime layer wires the pure core types to the pluggable interfaces.
//! It holds the listing version counters, the skip/take pager, the
//! version-keyed cache facade, the registration approval engine, and the
//! worker roster service, plus in-memory adapters for tests and demos.

/// Registration approval engine.
pub mod approval;
/// Version-keyed cache facade over a [`crate::interfaces::CacheStore`].
pub mod cache;
/// Event sink implementations.
pub mod events;
/// Notification composition.
pub mod notify;
/// Skip/take pagination over a [`crate::interfaces::PageSource`].
pub mod pager;
/// Worker roster service.
pub mod roster;
/// In-memory stores, cache, directory, and notifier.
pub mod store;
/// Per-entity listing version counters.
pub mod version;

pub use approval::ApprovalConfig;
pub use approval::ApprovalEngine;
pub use approval::ApprovalError;
pub use approval::DEFAULT_TOKEN_TTL;
pub use cache::CachedPager;
pub use cache::QueryError;
pub use events::LogEventSink;
pub use events::NullEventSink;
pub use events::RecordingEventSink;
pub use pager::CancelToken;
pub use pager::get_page;
pub use roster::NewWorkerAccount;
pub use roster::RosterError;
pub use roster::WorkerRoster;
pub use store::InMemoryIdentityDirectory;
pub use store::InMemoryRegistrationStore;
pub use store::InMemoryWorkerStore;
pub use store::MemoryCache;
pub use store::RecordingNotifier;
pub use version::VersionCounter;
