// crates/agrotrack-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Workforce Store
// Description: Durable store backends for registrations, workers, identities.
// Purpose: Provide production-grade persistence for the AgroTrack core.
// Dependencies: agrotrack-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a `SQLite`-backed implementation of the AgroTrack
//! store interfaces: pending registrations with the atomic decision claim,
//! the filtered and ordered worker roster queries behind pagination, and a
//! minimal login identity directory. One shared connection serves all three
//! interfaces so the schema stays in a single file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteJournalMode;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
pub use store::SqliteWorkforceStore;
