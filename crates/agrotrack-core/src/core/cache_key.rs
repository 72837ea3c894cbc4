// crates/agrotrack-core/src/core/cache_key.rs
// ============================================================================
// Module: AgroTrack Cache Keys
// Description: Structured cache keys, expiry policies, and priority hints.
// Purpose: Render deterministic cache keys free of formatting drift.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Cache keys are structured values, not concatenated strings. A listing
//! key carries the entity name, the entity generation, and every query
//! parameter; it renders through RFC 8785 canonical JSON and a sha256
//! digest so two logically identical queries always share one entry.
//! Point-lookup keys form a separate, un-versioned family invalidated by
//! direct removal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::identifiers::EntityName;

// ============================================================================
// SECTION: Query Parameters
// ============================================================================

/// Ordered query-parameter map carried in listing cache keys.
///
/// # Invariants
/// - Keys are ordered; insertion order never affects the rendered key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a parameter, replacing any previous value for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style insert for fluent construction.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the parameter value for `name` when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

// ============================================================================
// SECTION: Key Errors
// ============================================================================

/// Errors raised while rendering a cache key.
#[derive(Debug, Error)]
pub enum CacheKeyError {
    /// Canonical JSON rendering of the parameter map failed.
    #[error("failed to canonicalize cache key params: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Cache Keys
// ============================================================================

/// Structured cache key for listing and point-lookup entries.
///
/// # Invariants
/// - Two keys with identical entity, version, and parameters render to the
///   same string; any difference renders to a distinct string.
/// - Listing keys embed the entity generation; point keys never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheKey {
    /// Versioned key family for paged listing queries.
    Listing {
        /// Entity collection name.
        entity: EntityName,
        /// Entity generation at the time of the query.
        version: u64,
        /// All query parameters, including filter, search, and sort.
        params: QueryParams,
    },
    /// Un-versioned key family for single-record lookups.
    Point {
        /// Entity collection name.
        entity: EntityName,
        /// Record identifier.
        record_id: u64,
    },
}

impl CacheKey {
    /// Creates a versioned listing key.
    #[must_use]
    pub const fn listing(entity: EntityName, version: u64, params: QueryParams) -> Self {
        Self::Listing {
            entity,
            version,
            params,
        }
    }

    /// Creates a point-lookup key.
    #[must_use]
    pub const fn point(entity: EntityName, record_id: u64) -> Self {
        Self::Point {
            entity,
            record_id,
        }
    }

    /// Renders the key to its canonical string form.
    ///
    /// Listing keys digest their parameter map through RFC 8785 canonical
    /// JSON so formatting can never split one logical query across two
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheKeyError::Canonicalization`] when the parameter map
    /// cannot be rendered.
    pub fn render(&self) -> Result<RenderedKey, CacheKeyError> {
        match self {
            Self::Listing {
                entity,
                version,
                params,
            } => {
                let canonical = serde_jcs::to_vec(params)
                    .map_err(|err| CacheKeyError::Canonicalization(err.to_string()))?;
                let mut hasher = Sha256::new();
                hasher.update(&canonical);
                let digest = hasher.finalize();
                Ok(RenderedKey(format!("{entity}/v{version}/{}", hex_encode(&digest))))
            }
            Self::Point {
                entity,
                record_id,
            } => Ok(RenderedKey(format!("{entity}/id/{record_id}"))),
        }
    }
}

/// Canonical string form of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedKey(String);

impl RenderedKey {
    /// Returns the rendered key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Cache Policy
// ============================================================================

/// Eviction priority hint for a cache entry.
///
/// # Invariants
/// - Variants are stable for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePriority {
    /// First to go when the cache sweeps.
    Low,
    /// Default priority.
    #[default]
    Normal,
    /// Never evicted by pressure sweeps; expiry still applies.
    NeverRemove,
}

/// Expiration policy for a cache entry.
///
/// # Invariants
/// - Windows are expressed in the host's timestamp units (milliseconds for
///   unix time, ticks for logical time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Sliding window renewed on every read; `None` disables it.
    pub sliding: Option<u64>,
    /// Absolute ceiling from insertion; `None` disables it.
    pub absolute: Option<u64>,
    /// Eviction priority hint.
    pub priority: CachePriority,
}

impl CachePolicy {
    /// Default listing policy: 10 minute sliding window, 30 minute
    /// absolute ceiling, low priority.
    #[must_use]
    pub const fn listing_default() -> Self {
        Self {
            sliding: Some(10 * 60 * 1_000),
            absolute: Some(30 * 60 * 1_000),
            priority: CachePriority::Low,
        }
    }

    /// Default point-lookup policy: 10 minute sliding window, 30 minute
    /// absolute ceiling, normal priority.
    #[must_use]
    pub const fn point_default() -> Self {
        Self {
            sliding: Some(10 * 60 * 1_000),
            absolute: Some(30 * 60 * 1_000),
            priority: CachePriority::Normal,
        }
    }
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
