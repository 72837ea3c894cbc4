// crates/agrotrack-core/src/core/time.rs
// ============================================================================
// Module: AgroTrack Time Model
// Description: Canonical timestamp representation for expiry and cache windows.
// Purpose: Provide deterministic, host-supplied time values across AgroTrack.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! AgroTrack uses explicit time values supplied by the host on every call
//! that needs one. The core never reads wall-clock time directly, which
//! keeps token expiry and cache-window checks deterministic and testable.
//! Hosts must supply timestamps of a single kind throughout a deployment;
//! values of different kinds are incomparable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used for registration expiry and cache windows.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads
///   wall-clock time.
/// - Comparisons are only defined between values of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }

    /// Returns true when `self` is strictly before `other`.
    ///
    /// Values of different kinds are incomparable and report `false`.
    #[must_use]
    pub const fn is_before(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UnixMillis(a), Self::UnixMillis(b)) => *a < *b,
            (Self::Logical(a), Self::Logical(b)) => *a < *b,
            _ => false,
        }
    }

    /// Returns the elapsed delta from `earlier` to `self`, when comparable,
    /// non-negative, and representable.
    #[must_use]
    pub const fn since(&self, earlier: &Self) -> Option<u64> {
        match (earlier, self) {
            // Host-supplied values may sit anywhere in the i64 range, so
            // the delta itself can exceed i64; treat overflow as
            // incomparable rather than wrapping.
            (Self::UnixMillis(a), Self::UnixMillis(b)) => match b.checked_sub(*a) {
                Some(delta) if delta >= 0 => Some(delta as u64),
                _ => None,
            },
            (Self::Logical(a), Self::Logical(b)) => {
                if *b >= *a {
                    Some(*b - *a)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Returns a timestamp advanced by `delta` units of the same kind
    /// (milliseconds for unix time, ticks for logical time).
    #[must_use]
    pub const fn plus(&self, delta: u64) -> Self {
        match self {
            Self::UnixMillis(value) => Self::UnixMillis(value.saturating_add(delta as i64)),
            Self::Logical(value) => Self::Logical(value.saturating_add(delta)),
        }
    }
}
