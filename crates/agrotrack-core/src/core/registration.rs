// crates/agrotrack-core/src/core/registration.rs
// ============================================================================
// Module: AgroTrack Registration Types
// Description: Pending registrations, decision actions, and decision outcomes.
// Purpose: Model the approval workflow's state and its terminal outcomes.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A pending registration is a self-service sign-up awaiting a token-based
//! or administrator decision. Decisions are terminal: once processed, a
//! registration is removed from the pending set and its token is dead.
//! Expected failures (not found, expired, already processed) are outcome
//! values, never errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ApprovalToken;
use crate::core::identifiers::RegistrationId;
use crate::core::identifiers::UserId;
use crate::core::identifiers::WorkerId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Pending Registration
// ============================================================================

/// Self-service worker application awaiting approval or rejection.
///
/// # Invariants
/// - `approval_token` grants decision rights only while `!is_processed`
///   and the token has not expired.
/// - Once processed the registration is terminal; no path mutates it other
///   than the approval workflow.
/// - `password_hash` is the securely pre-hashed credential; it is reused
///   verbatim at approval time and never re-hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    /// Store-assigned identifier.
    pub id: RegistrationId,
    /// Applicant first name.
    pub first_name: String,
    /// Applicant last name.
    pub last_name: String,
    /// Applicant email; unique across the pending set.
    pub email: String,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Optional position applied for.
    pub position: Option<String>,
    /// Securely hashed password captured at sign-up.
    pub password_hash: String,
    /// Sign-up timestamp.
    pub requested_at: Timestamp,
    /// Unguessable decision token for the email link path.
    pub approval_token: ApprovalToken,
    /// Token validity ceiling.
    pub token_expires_at: Timestamp,
    /// True once a decision has been recorded.
    pub is_processed: bool,
}

/// Sign-up request fields for a new pending registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistration {
    /// Applicant first name.
    pub first_name: String,
    /// Applicant last name.
    pub last_name: String,
    /// Applicant email.
    pub email: String,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Optional position applied for.
    pub position: Option<String>,
    /// Securely hashed password; hashing happens before the core is called.
    pub password_hash: String,
}

// ============================================================================
// SECTION: Decision Actions
// ============================================================================

/// Decision requested against a pending registration.
///
/// # Invariants
/// - Variants are stable for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    /// Approve the application and create the worker account.
    Approve,
    /// Reject the application.
    Reject,
}

// ============================================================================
// SECTION: Decision Outcomes
// ============================================================================

/// Outcome of a decision against a pending registration.
///
/// Expected failures are carried here as values so callers can present
/// them; only upstream failures (store, identity directory) surface as
/// errors.
///
/// # Invariants
/// - `NotFound` covers empty tokens, unknown tokens or ids, and
///   already-processed registrations.
/// - `Expired` is reported only for registrations that exist and are
///   unprocessed, so it is always distinguishable from `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// Application approved; worker account created.
    Approved {
        /// Applicant first name for confirmation messaging.
        first_name: String,
        /// Identifier of the created worker profile.
        worker_id: WorkerId,
        /// Identifier of the created login identity.
        user_id: UserId,
    },
    /// Application rejected and removed from the pending set.
    Rejected {
        /// Applicant first name for rejection messaging.
        first_name: String,
    },
    /// No matching unprocessed registration.
    NotFound,
    /// Registration exists and is unprocessed, but the token has expired.
    Expired,
}

impl DecisionOutcome {
    /// Returns true for the two terminal success outcomes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Approved { .. } | Self::Rejected { .. })
    }

    /// Returns the user-facing message for this outcome.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Approved { .. } => "Registration approved.",
            Self::Rejected { .. } => "Registration request rejected.",
            Self::NotFound => "Registration request not found or already processed.",
            Self::Expired => "This approval link has expired.",
        }
    }
}

/// Controller-facing reply shape for a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionReply {
    /// True when the decision completed.
    pub success: bool,
    /// User-facing message describing the outcome.
    pub message: String,
    /// Applicant first name on success, for confirmation views.
    pub applicant_first_name: Option<String>,
}

impl From<&DecisionOutcome> for DecisionReply {
    fn from(outcome: &DecisionOutcome) -> Self {
        let applicant_first_name = match outcome {
            DecisionOutcome::Approved {
                first_name, ..
            }
            | DecisionOutcome::Rejected {
                first_name,
            } => Some(first_name.clone()),
            DecisionOutcome::NotFound | DecisionOutcome::Expired => None,
        };
        Self {
            success: outcome.is_success(),
            message: outcome.message().to_string(),
            applicant_first_name,
        }
    }
}
