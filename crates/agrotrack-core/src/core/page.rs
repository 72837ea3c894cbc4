// crates/agrotrack-core/src/core/page.rs
// ============================================================================
// Module: AgroTrack Page Types
// Description: Page requests, paged results, and sort direction values.
// Purpose: Provide bounded, deterministic page shapes for listing queries.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A page is a bounded, offset-based slice of an ordered, filtered
//! collection. `PageRequest` validates caller parameters up front so the
//! executor never sees a malformed page coordinate; `PagedResult` carries
//! the slice together with the pre-pagination total.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Sort Direction
// ============================================================================

/// Sort direction for listing queries.
///
/// # Invariants
/// - Variants are stable for serialization and cache-key rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

impl SortDirection {
    /// Parses a direction from caller input, defaulting to ascending.
    ///
    /// Only a case-insensitive `desc` selects descending; anything else,
    /// including `None`, is ascending. Unrecognized input never fails the
    /// request.
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.eq_ignore_ascii_case("desc") => Self::Descending,
            _ => Self::Ascending,
        }
    }

    /// Returns a stable label for cache-key rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

// ============================================================================
// SECTION: Page Request
// ============================================================================

/// Errors raised for malformed pagination parameters.
///
/// These are caller contract violations, returned immediately and never
/// retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    /// Page number or page size below the allowed minimum.
    #[error("invalid page parameters: page {page_number}, size {page_size} (both must be >= 1)")]
    InvalidArgument {
        /// Requested page number.
        page_number: u64,
        /// Requested page size.
        page_size: u64,
    },
    /// The in-flight operation was cancelled by the caller.
    #[error("page query cancelled")]
    Cancelled,
    /// The backing source failed while counting or fetching.
    #[error("page source error: {0}")]
    Source(String),
}

/// Validated page coordinates for a listing query.
///
/// # Invariants
/// - `page_number >= 1` and `page_size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// One-based page number.
    page_number: u64,
    /// Maximum number of items per page.
    page_size: u64,
}

impl PageRequest {
    /// Creates a validated page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidArgument`] when either coordinate is
    /// below one.
    pub const fn new(page_number: u64, page_size: u64) -> Result<Self, PageError> {
        if page_number < 1 || page_size < 1 {
            return Err(PageError::InvalidArgument {
                page_number,
                page_size,
            });
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn page_number(&self) -> u64 {
        self.page_number
    }

    /// Returns the page size.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Returns the number of items to skip before this page.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

// ============================================================================
// SECTION: Paged Result
// ============================================================================

/// A bounded page of items plus the pre-pagination total.
///
/// # Invariants
/// - `items.len() == min(page_size, max(0, total_items - (page_number-1)*page_size))`.
/// - Item order is deterministic for identical queries (cache correctness).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items on this page, at most `page_size` of them.
    pub items: Vec<T>,
    /// One-based page number this slice corresponds to.
    pub page_number: u64,
    /// Requested page size.
    pub page_size: u64,
    /// Total items in the filtered collection before pagination.
    pub total_items: u64,
}

impl<T> PagedResult<T> {
    /// Returns the total page count for the filtered collection.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.page_size)
    }

    /// Returns true when this page carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Serialize> PagedResult<T> {
    /// Serializes the page into a cacheable JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns a serialization message when the item type cannot be
    /// represented as JSON.
    pub fn to_snapshot(&self) -> Result<serde_json::Value, String> {
        serde_json::to_value(self).map_err(|err| err.to_string())
    }
}

impl<T: DeserializeOwned> PagedResult<T> {
    /// Rehydrates a page from a cached JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns a deserialization message when the snapshot does not match
    /// the expected page shape.
    pub fn from_snapshot(snapshot: serde_json::Value) -> Result<Self, String> {
        serde_json::from_value(snapshot).map_err(|err| err.to_string())
    }
}
