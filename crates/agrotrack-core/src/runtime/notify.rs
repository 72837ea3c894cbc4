// crates/agrotrack-core/src/runtime/notify.rs
// ============================================================================
// Module: AgroTrack Notification Composition
// Description: Subject and body composition for workflow notifications.
// Purpose: Build the messages the approval engine hands to the notifier.
// Dependencies: crate::core, time
// ============================================================================

//! ## Overview
//! Plain-text message composition for the three workflow notifications:
//! the admin request raised at sign-up (carrying approve/reject links),
//! the approval confirmation, and the rejection notice. HTML rendering is
//! a presentation-layer concern and stays out of the core.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::PendingRegistration;
use crate::core::Timestamp;
use crate::interfaces::Notification;

// ============================================================================
// SECTION: Composition
// ============================================================================

/// Builds the administrator notification for a new sign-up, with decision
/// links for the token path.
#[must_use]
pub fn admin_request(
    admin_recipient: &str,
    public_base_url: &str,
    registration: &PendingRegistration,
) -> Notification {
    let base = public_base_url.trim_end_matches('/');
    let approve_link =
        format!("{base}/registration/approve?token={}", registration.approval_token);
    let reject_link = format!("{base}/registration/reject?token={}", registration.approval_token);
    let subject = format!(
        "New Registration Request - {} {}",
        registration.first_name, registration.last_name
    );
    let body = format!(
        "New worker registration request\n\
         Name: {} {}\n\
         Email: {}\n\
         Phone: {}\n\
         Position: {}\n\
         Requested: {}\n\
         \n\
         Approve: {approve_link}\n\
         Reject: {reject_link}\n",
        registration.first_name,
        registration.last_name,
        registration.email,
        registration.phone_number.as_deref().unwrap_or("N/A"),
        registration.position.as_deref().unwrap_or("N/A"),
        render_timestamp(registration.requested_at),
    );
    Notification {
        recipient: admin_recipient.to_string(),
        subject,
        body,
    }
}

/// Builds the approval confirmation sent to the applicant.
#[must_use]
pub fn approval_confirmation(email: &str, first_name: &str) -> Notification {
    Notification {
        recipient: email.to_string(),
        subject: "Your Registration Has Been Approved".to_string(),
        body: format!(
            "Welcome, {first_name}!\n\
             Your worker registration has been approved.\n\
             You can now log in with your registered email address.\n"
        ),
    }
}

/// Builds the rejection notice sent to the applicant.
#[must_use]
pub fn rejection_notice(email: &str, first_name: &str) -> Notification {
    Notification {
        recipient: email.to_string(),
        subject: "Registration Request Update".to_string(),
        body: format!(
            "Hello {first_name},\n\
             Unfortunately, your registration request could not be approved \
             at this time.\n\
             Please contact the administrator for more information.\n"
        ),
    }
}

// ============================================================================
// SECTION: Timestamp Rendering
// ============================================================================

/// Renders a timestamp for message bodies.
fn render_timestamp(value: Timestamp) -> String {
    match value {
        Timestamp::UnixMillis(millis) => {
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                .ok()
                .and_then(|dt| dt.format(&Rfc3339).ok())
                .unwrap_or_else(|| format!("{millis} ms since epoch"))
        }
        Timestamp::Logical(tick) => format!("tick {tick}"),
    }
}
