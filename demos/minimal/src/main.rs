// demos/minimal/src/main.rs
// ============================================================================
// Module: AgroTrack Minimal Demo
// Description: Minimal end-to-end approval and cached listing walkthrough.
// Purpose: Demonstrate sign-up, token approval, and the cached roster.
// Dependencies: agrotrack-core
// ============================================================================

//! ## Overview
//! Runs the registration workflow and the cached worker roster end to end
//! against the in-memory adapters. Events stream to stderr as JSON lines so
//! the cache hits, misses, and version bumps are visible.

use std::io::Write;

use agrotrack_core::ApprovalConfig;
use agrotrack_core::ApprovalEngine;
use agrotrack_core::CachedPager;
use agrotrack_core::CancelToken;
use agrotrack_core::DecisionAction;
use agrotrack_core::DecisionOutcome;
use agrotrack_core::InMemoryIdentityDirectory;
use agrotrack_core::InMemoryRegistrationStore;
use agrotrack_core::InMemoryWorkerStore;
use agrotrack_core::LogEventSink;
use agrotrack_core::MemoryCache;
use agrotrack_core::NewRegistration;
use agrotrack_core::RecordingNotifier;
use agrotrack_core::Timestamp;
use agrotrack_core::VersionCounter;
use agrotrack_core::WorkerRoster;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let workers = InMemoryWorkerStore::new();
    let identities = InMemoryIdentityDirectory::new();
    let notifier = RecordingNotifier::new();
    let versions = VersionCounter::new();

    let engine = ApprovalEngine::new(
        InMemoryRegistrationStore::new(),
        workers.clone(),
        identities.clone(),
        notifier.clone(),
        LogEventSink::new(std::io::stderr()),
        versions.clone(),
        ApprovalConfig {
            admin_recipient: "admin@agroservis.example".to_string(),
            public_base_url: "https://track.agroservis.example".to_string(),
            token_ttl: 72 * 60 * 60 * 1_000,
        },
    );

    // A mechanic signs up; the admin notification carries decision links.
    let created = engine.submit(
        &NewRegistration {
            first_name: "Jana".to_string(),
            last_name: "Novakova".to_string(),
            email: "jana@farm.example".to_string(),
            phone_number: Some("+420123456789".to_string()),
            position: Some("Mechanic".to_string()),
            password_hash: "argon2id$demo-hash".to_string(),
        },
        Timestamp::UnixMillis(1_700_000_000_000),
    )?;
    write_line("submitted", &created.email)?;
    write_line("pending", &engine.pending()?.len().to_string())?;

    // The admin follows the approve link.
    let outcome = engine.decide_by_token(
        &created.approval_token,
        DecisionAction::Approve,
        Timestamp::UnixMillis(1_700_000_100_000),
    )?;
    write_line("decision", outcome.message())?;
    if let DecisionOutcome::Approved {
        worker_id, ..
    } = &outcome
    {
        write_line("worker_id", &worker_id.to_string())?;
    }

    // A second use of the same link changes nothing.
    let replay = engine.decide_by_token(
        &created.approval_token,
        DecisionAction::Approve,
        Timestamp::UnixMillis(1_700_000_200_000),
    )?;
    write_line("replay", replay.message())?;

    // The roster shares the version counters, so the approval already
    // invalidated any cached worker listings.
    let pager = CachedPager::new(MemoryCache::new(), versions, LogEventSink::new(std::io::stderr()));
    let roster = WorkerRoster::new(workers, identities, pager);
    let cancel = CancelToken::new();
    let now = Timestamp::UnixMillis(1_700_000_300_000);

    // First listing misses, second is served from cache.
    for _ in 0..2 {
        let page = roster.list(1, 10, Some("lastName"), None, None, now, &cancel)?;
        write_line("roster_total", &page.total_items.to_string())?;
    }

    write_line("notifications_sent", &notifier.messages().len().to_string())?;
    Ok(())
}

/// Writes a labeled line to stdout.
fn write_line(label: &str, value: &str) -> Result<(), std::io::Error> {
    let mut out = std::io::stdout();
    writeln!(out, "{label}: {value}")?;
    Ok(())
}
