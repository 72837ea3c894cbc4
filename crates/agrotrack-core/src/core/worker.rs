// crates/agrotrack-core/src/core/worker.rs
// ============================================================================
// Module: AgroTrack Worker Types
// Description: Worker profiles, listing queries, and the closed sort-key set.
// Purpose: Model the worker roster and its deterministic query surface.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A worker profile is created only as an effect of a successful approval
//! or an administrator-initiated create, and is always linked 1:1 to a
//! login identity. Listing queries accept only the closed sort-key set
//! below; arbitrary field names never reach the execution layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::UserId;
use crate::core::identifiers::WorkerId;
use crate::core::page::SortDirection;

// ============================================================================
// SECTION: Worker Records
// ============================================================================

/// Worker profile record.
///
/// # Invariants
/// - `user_id` references an existing login identity; no orphaned worker
///   may exist without one and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    /// Store-assigned identifier.
    pub id: WorkerId,
    /// Worker first name.
    pub first_name: String,
    /// Worker last name.
    pub last_name: String,
    /// Worker email; unique across the roster.
    pub email: String,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Optional position.
    pub position: Option<String>,
    /// Linked login identity.
    pub user_id: UserId,
}

/// Fields for creating a worker profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorker {
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
    /// Linked login identity.
    pub user_id: UserId,
}

// ============================================================================
// SECTION: Sort Keys
// ============================================================================

/// Closed set of sortable worker fields.
///
/// # Invariants
/// - Unresolvable caller input falls back to [`WorkerSortKey::LastName`];
///   a bad sort key never fails the request.
/// - Ties are broken by worker id so repeated queries return identical
///   pages (required for cache correctness).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerSortKey {
    /// Sort by worker id.
    Id,
    /// Sort by first name.
    FirstName,
    /// Sort by last name (documented default).
    #[default]
    LastName,
    /// Sort by email.
    Email,
    /// Sort by position.
    Position,
}

impl WorkerSortKey {
    /// Resolves caller input against the allowed set, case-insensitively,
    /// falling back to the default key.
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(key) if key.eq_ignore_ascii_case("id") => Self::Id,
            Some(key) if key.eq_ignore_ascii_case("firstname") => Self::FirstName,
            Some(key) if key.eq_ignore_ascii_case("lastname") => Self::LastName,
            Some(key) if key.eq_ignore_ascii_case("email") => Self::Email,
            Some(key) if key.eq_ignore_ascii_case("position") => Self::Position,
            _ => Self::default(),
        }
    }

    /// Returns a stable label for cache-key rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "firstname",
            Self::LastName => "lastname",
            Self::Email => "email",
            Self::Position => "position",
        }
    }
}

// ============================================================================
// SECTION: Listing Query
// ============================================================================

/// Filter and ordering parameters for a worker listing.
///
/// # Invariants
/// - `search` matches case-insensitively against first name, last name,
///   email, and position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerQuery {
    /// Optional substring search across name, email, and position.
    pub search: Option<String>,
    /// Resolved sort key.
    pub sort_key: WorkerSortKey,
    /// Sort direction.
    pub direction: SortDirection,
}

impl WorkerQuery {
    /// Builds a query from raw caller input, resolving the sort key and
    /// direction against their allowed sets.
    #[must_use]
    pub fn from_raw(search: Option<&str>, sort_by: Option<&str>, sort_dir: Option<&str>) -> Self {
        let search = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            search,
            sort_key: WorkerSortKey::parse_or_default(sort_by),
            direction: SortDirection::parse_or_default(sort_dir),
        }
    }
}
