// crates/agrotrack-core/src/runtime/approval.rs
// ============================================================================
// Module: AgroTrack Approval Engine
// Description: Registration lifecycle from sign-up through approval/rejection.
// Purpose: Execute terminal decisions idempotently with atomic account creation.
// Dependencies: crate::{core, interfaces, runtime}, rand
// ============================================================================

//! ## Overview
//! The approval engine is the single execution path for registration
//! decisions. A pending registration moves to exactly one terminal state,
//! Approved or Rejected; the transition is serialized by a check-and-set
//! claim on `is_processed`, so a second decision on the same token or id
//! observes `NotFound` and no duplicate identity or notification can
//! occur. Registration removal is the authoritative terminal action and
//! is persisted before any notification is attempted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use thiserror::Error;

use crate::core::ApprovalToken;
use crate::core::DecisionAction;
use crate::core::DecisionOutcome;
use crate::core::EntityName;
use crate::core::Event;
use crate::core::NewRegistration;
use crate::core::NewWorker;
use crate::core::PendingRegistration;
use crate::core::RegistrationId;
use crate::core::Timestamp;
use crate::interfaces::EventSink;
use crate::interfaces::IdentityDirectory;
use crate::interfaces::IdentityError;
use crate::interfaces::NewIdentity;
use crate::interfaces::Notifier;
use crate::interfaces::RegistrationStore;
use crate::interfaces::StoreError;
use crate::interfaces::WORKER_ROLE;
use crate::interfaces::WorkerStore;
use crate::runtime::notify;
use crate::runtime::version::VersionCounter;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default token validity window: 72 hours in milliseconds.
pub const DEFAULT_TOKEN_TTL: u64 = 72 * 60 * 60 * 1_000;

/// Approval engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApprovalConfig {
    /// Recipient for new sign-up notifications.
    pub admin_recipient: String,
    /// Public base URL used to build decision links.
    pub public_base_url: String,
    /// Token validity window in the host's timestamp units.
    #[serde(default = "default_token_ttl")]
    pub token_ttl: u64,
}

/// Returns the default token validity window.
const fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Upstream failures surfaced by the approval engine.
///
/// Expected outcomes (not found, expired, already processed) are
/// [`DecisionOutcome`] values, not errors; an `Err` here means the
/// decision aborted cleanly with no partial state.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Backing store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Identity directory failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

// ============================================================================
// SECTION: Approval Engine
// ============================================================================

/// Registration approval state machine.
///
/// # Invariants
/// - `Pending -> Approved` and `Pending -> Rejected` are the only
///   transitions; terminal states have no exits.
/// - The claim on `is_processed` is the linearization point; concurrent
///   decisions on one registration resolve to exactly one winner.
/// - Identity and worker-profile creation form one logical unit: a
///   failure inside it releases the claim and leaves no partial state.
/// - Once the account exists the approval is durable: later removal or
///   notification failures are recorded, never unwound.
pub struct ApprovalEngine<R, W, I, N, E> {
    /// Pending registration store.
    registrations: R,
    /// Worker profile store.
    workers: W,
    /// Login identity directory.
    identities: I,
    /// Notification transport.
    notifier: N,
    /// Observability sink.
    events: E,
    /// Shared per-entity generation counters.
    versions: VersionCounter,
    /// Engine configuration.
    config: ApprovalConfig,
}

impl<R, W, I, N, E> ApprovalEngine<R, W, I, N, E>
where
    R: RegistrationStore,
    W: WorkerStore,
    I: IdentityDirectory,
    N: Notifier,
    E: EventSink,
{
    /// Creates a new approval engine.
    #[must_use]
    pub const fn new(
        registrations: R,
        workers: W,
        identities: I,
        notifier: N,
        events: E,
        versions: VersionCounter,
        config: ApprovalConfig,
    ) -> Self {
        Self {
            registrations,
            workers,
            identities,
            notifier,
            events,
            versions,
            config,
        }
    }

    /// Records a self-service sign-up and notifies the administrator.
    ///
    /// Generates an unguessable single-use token valid for the configured
    /// window. The admin notification carries approve/reject links; its
    /// failure is recorded and does not fail the sign-up.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] (wrapped) when the email is
    /// already registered, and other store errors when persistence fails.
    pub fn submit(
        &self,
        registration: &NewRegistration,
        now: Timestamp,
    ) -> Result<PendingRegistration, ApprovalError> {
        let token = generate_token();
        let expires_at = now.plus(self.config.token_ttl);
        let created = self.registrations.create(registration, &token, now, expires_at)?;

        self.versions.bump(&EntityName::registration(), &self.events);
        self.events.emit(&Event::RegistrationSubmitted {
            id: created.id,
            email: created.email.clone(),
        });

        let message = notify::admin_request(
            &self.config.admin_recipient,
            &self.config.public_base_url,
            &created,
        );
        if let Err(err) = self.notifier.send(&message) {
            self.events.emit(&Event::NotificationFailed {
                recipient: message.recipient,
                reason: err.to_string(),
            });
        }
        Ok(created)
    }

    /// Lists unprocessed registrations, newest first, for the admin view.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Store`] when the backing query fails.
    pub fn pending(&self) -> Result<Vec<PendingRegistration>, ApprovalError> {
        Ok(self.registrations.list_pending()?)
    }

    /// Decides a registration through its emailed token.
    ///
    /// Fails closed to `NotFound` for empty tokens, unknown tokens, and
    /// already-processed registrations. Expiry is checked only after the
    /// registration is found unprocessed, so an expired-but-found token
    /// reports `Expired`, never `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError`] when a backing system fails; the
    /// registration then remains pending.
    pub fn decide_by_token(
        &self,
        token: &ApprovalToken,
        action: DecisionAction,
        now: Timestamp,
    ) -> Result<DecisionOutcome, ApprovalError> {
        if token.is_empty() {
            return Ok(DecisionOutcome::NotFound);
        }
        let Some(registration) = self.registrations.find_by_token(token)? else {
            return Ok(DecisionOutcome::NotFound);
        };
        if registration.token_expires_at.is_before(&now) {
            return Ok(DecisionOutcome::Expired);
        }
        self.decide(registration, action)
    }

    /// Decides a registration by identifier from an administrative
    /// session.
    ///
    /// Identical semantics to the token path except there is no expiry
    /// check: id-based approval is pre-authenticated, not a time-boxed
    /// link. This asymmetry is intentional.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError`] when a backing system fails.
    pub fn decide_by_id(
        &self,
        id: RegistrationId,
        action: DecisionAction,
        _now: Timestamp,
    ) -> Result<DecisionOutcome, ApprovalError> {
        let Some(registration) = self.registrations.find_by_id(id)? else {
            return Ok(DecisionOutcome::NotFound);
        };
        self.decide(registration, action)
    }

    /// Executes the terminal transition for a found, unexpired (or
    /// admin-vouched) registration.
    fn decide(
        &self,
        registration: PendingRegistration,
        action: DecisionAction,
    ) -> Result<DecisionOutcome, ApprovalError> {
        // The claim is the linearization point: the losing side of any
        // race observes an already-processed registration.
        if !self.registrations.claim(registration.id)? {
            return Ok(DecisionOutcome::NotFound);
        }
        match action {
            DecisionAction::Approve => self.approve(registration),
            DecisionAction::Reject => self.reject(&registration),
        }
    }

    /// Creates the identity and worker profile, removes the registration,
    /// and sends the confirmation.
    fn approve(
        &self,
        registration: PendingRegistration,
    ) -> Result<DecisionOutcome, ApprovalError> {
        let identity = NewIdentity {
            email: registration.email.clone(),
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            // Reuse the pre-hashed credential captured at sign-up.
            password_hash: registration.password_hash.clone(),
            role: WORKER_ROLE.to_string(),
        };
        let user_id = match self.identities.create_identity(&identity) {
            Ok(user_id) => user_id,
            Err(err) => {
                self.registrations.release(registration.id)?;
                return Err(ApprovalError::Identity(err));
            }
        };

        let profile = NewWorker {
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            email: registration.email.clone(),
            phone_number: registration.phone_number.clone(),
            position: registration.position.clone(),
            user_id: user_id.clone(),
        };
        let worker_id = match self.workers.insert(&profile) {
            Ok(worker_id) => worker_id,
            Err(err) => {
                // Compensate so no identity exists without its worker.
                if let Err(cleanup) = self.identities.remove_identity(&user_id) {
                    return Err(ApprovalError::Store(StoreError::Store(format!(
                        "worker insert failed ({err}); identity cleanup failed ({cleanup})"
                    ))));
                }
                self.registrations.release(registration.id)?;
                return Err(ApprovalError::Store(err));
            }
        };

        // The created account is the durable outcome. A failed removal is
        // recorded and never unwinds the approval: the held claim already
        // keeps the row out of every pending lookup.
        if let Err(err) = self.registrations.remove(registration.id) {
            self.events.emit(&Event::RegistrationCleanupFailed {
                id: registration.id,
                reason: err.to_string(),
            });
        }
        self.versions.bump(&EntityName::worker(), &self.events);
        self.versions.bump(&EntityName::registration(), &self.events);
        self.events.emit(&Event::RegistrationApproved {
            id: registration.id,
            email: registration.email.clone(),
        });

        let message =
            notify::approval_confirmation(&registration.email, &registration.first_name);
        if let Err(err) = self.notifier.send(&message) {
            // Approval is durable once persisted; delivery failure is
            // recorded, never rolled back.
            self.events.emit(&Event::NotificationFailed {
                recipient: message.recipient,
                reason: err.to_string(),
            });
        }

        Ok(DecisionOutcome::Approved {
            first_name: registration.first_name,
            worker_id,
            user_id,
        })
    }

    /// Removes the registration and sends the rejection notice.
    fn reject(
        &self,
        registration: &PendingRegistration,
    ) -> Result<DecisionOutcome, ApprovalError> {
        // Authoritative terminal action, persisted before notification: a
        // notifier outage never leaves a rejected registration pending.
        self.registrations.remove(registration.id)?;
        self.versions.bump(&EntityName::registration(), &self.events);
        self.events.emit(&Event::RegistrationRejected {
            id: registration.id,
            email: registration.email.clone(),
        });

        let message = notify::rejection_notice(&registration.email, &registration.first_name);
        if let Err(err) = self.notifier.send(&message) {
            self.events.emit(&Event::NotificationFailed {
                recipient: message.recipient,
                reason: err.to_string(),
            });
        }

        Ok(DecisionOutcome::Rejected {
            first_name: registration.first_name.clone(),
        })
    }
}

// ============================================================================
// SECTION: Token Generation
// ============================================================================

/// Generates an unguessable 256-bit approval token in hex form.
fn generate_token() -> ApprovalToken {
    let mut bytes = [0_u8; 32];
    OsRng.fill_bytes(&mut bytes);
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(64);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    ApprovalToken::new(out)
}
