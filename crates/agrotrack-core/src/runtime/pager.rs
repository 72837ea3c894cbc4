// crates/agrotrack-core/src/runtime/pager.rs
// ============================================================================
// Module: AgroTrack Paged Query Executor
// Description: Offset pagination over counted, fetchable sources.
// Purpose: Produce bounded pages with totals computed before the slice.
// Dependencies: crate::{core, interfaces}, std
// ============================================================================

//! ## Overview
//! The executor turns a [`PageSource`] into a [`PagedResult`]: count the
//! filtered collection, then skip/take the requested window. Pages past
//! the end are empty, not errors. Callers may supply a [`CancelToken`];
//! cancellation is checked before each source round-trip so an abandoned
//! request does no further work and is never cached upstream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::core::PageError;
use crate::core::PageRequest;
use crate::core::PagedResult;
use crate::interfaces::PageSource;

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cancellation signal shared between a caller and an in-flight query.
///
/// # Invariants
/// - Once cancelled, a token stays cancelled.
#[derive(Debug, Default, Clone)]
pub struct CancelToken {
    /// Shared cancellation flag.
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a live (uncancelled) token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation of the associated operation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Executes a paged query against `source`.
///
/// The total is computed against the filtered, pre-pagination collection;
/// the window is `skip = (page-1) * size`, `take = size`. Determinism of
/// item order is the source's contract (sort key plus id tie-break).
///
/// # Errors
///
/// Returns [`PageError::Cancelled`] when `cancel` fires before a source
/// round-trip, and [`PageError::Source`] when the source fails.
pub fn get_page<T, S: PageSource<T>>(
    source: &S,
    request: PageRequest,
    cancel: &CancelToken,
) -> Result<PagedResult<T>, PageError> {
    if cancel.is_cancelled() {
        return Err(PageError::Cancelled);
    }
    let total_items = source.count().map_err(|err| PageError::Source(err.to_string()))?;

    if cancel.is_cancelled() {
        return Err(PageError::Cancelled);
    }
    let skip = request.skip();
    let items = if skip >= total_items {
        Vec::new()
    } else {
        source
            .fetch(skip, request.page_size())
            .map_err(|err| PageError::Source(err.to_string()))?
    };

    Ok(PagedResult {
        items,
        page_number: request.page_number(),
        page_size: request.page_size(),
        total_items,
    })
}
