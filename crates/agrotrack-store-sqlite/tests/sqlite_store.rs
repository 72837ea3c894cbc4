// crates/agrotrack-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Workforce Store Tests
// Description: Validates the durable store against the core interfaces.
// ============================================================================
//! ## Overview
//! Exercises registration persistence and the atomic decision claim, roster
//! filtering and ordering, the identity directory, and reopen durability
//! against real database files.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use agrotrack_core::ApprovalToken;
use agrotrack_core::IdentityDirectory;
use agrotrack_core::NewIdentity;
use agrotrack_core::NewRegistration;
use agrotrack_core::NewWorker;
use agrotrack_core::RegistrationId;
use agrotrack_core::RegistrationStore;
use agrotrack_core::StoreError;
use agrotrack_core::Timestamp;
use agrotrack_core::UserId;
use agrotrack_core::WORKER_ROLE;
use agrotrack_core::WorkerQuery;
use agrotrack_core::WorkerStore;
use agrotrack_store_sqlite::SqliteStoreConfig;
use agrotrack_store_sqlite::SqliteWorkforceStore;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> SqliteWorkforceStore {
    let config = SqliteStoreConfig {
        path: dir.path().join("workforce.db"),
        busy_timeout_ms: 1_000,
        journal_mode: agrotrack_store_sqlite::SqliteJournalMode::Wal,
        sync_mode: agrotrack_store_sqlite::SqliteSyncMode::Normal,
    };
    SqliteWorkforceStore::new(&config).unwrap()
}

fn applicant(email: &str) -> NewRegistration {
    NewRegistration {
        first_name: "Jana".to_string(),
        last_name: "Novakova".to_string(),
        email: email.to_string(),
        phone_number: Some("+420123456789".to_string()),
        position: Some("Mechanic".to_string()),
        password_hash: "argon2id$fixture-hash".to_string(),
    }
}

fn worker(first: &str, last: &str, email: &str, position: Option<&str>) -> NewWorker {
    NewWorker {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone_number: None,
        position: position.map(str::to_string),
        user_id: UserId::new(format!("user-{email}")),
    }
}

#[test]
fn registration_round_trips_through_the_database() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let token = ApprovalToken::new("token-a");

    let created = store
        .create(
            &applicant("jana@farm.example"),
            &token,
            Timestamp::UnixMillis(1_000),
            Timestamp::UnixMillis(2_000),
        )
        .unwrap();

    let found = store.find_by_token(&token).unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(found.requested_at, Timestamp::UnixMillis(1_000));
    assert_eq!(found.token_expires_at, Timestamp::UnixMillis(2_000));

    let by_id = store.find_by_id(created.id).unwrap().unwrap();
    assert_eq!(by_id, created);
}

#[test]
fn logical_timestamps_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let token = ApprovalToken::new("token-a");
    let created = store
        .create(&applicant("jana@farm.example"), &token, Timestamp::Logical(7), Timestamp::Logical(9))
        .unwrap();
    let found = store.find_by_id(created.id).unwrap().unwrap();
    assert_eq!(found.requested_at, Timestamp::Logical(7));
    assert_eq!(found.token_expires_at, Timestamp::Logical(9));
}

#[test]
fn duplicate_pending_email_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let now = Timestamp::Logical(0);
    store
        .create(&applicant("jana@farm.example"), &ApprovalToken::new("t1"), now, now)
        .unwrap();
    let result =
        store.create(&applicant("JANA@farm.example"), &ApprovalToken::new("t2"), now, now);
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[test]
fn claim_fires_exactly_once() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let token = ApprovalToken::new("token-a");
    let created = store
        .create(&applicant("jana@farm.example"), &token, Timestamp::Logical(0), Timestamp::Logical(9))
        .unwrap();

    assert!(store.claim(created.id).unwrap());
    assert!(!store.claim(created.id).unwrap());

    // Processed registrations vanish from the pending lookups.
    assert!(store.find_by_token(&token).unwrap().is_none());
    assert!(store.find_by_id(created.id).unwrap().is_none());
    assert!(store.list_pending().unwrap().is_empty());
}

#[test]
fn release_restores_the_pending_state() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let token = ApprovalToken::new("token-a");
    let created = store
        .create(&applicant("jana@farm.example"), &token, Timestamp::Logical(0), Timestamp::Logical(9))
        .unwrap();

    assert!(store.claim(created.id).unwrap());
    store.release(created.id).unwrap();
    assert!(store.find_by_token(&token).unwrap().is_some());
    assert!(store.claim(created.id).unwrap());
}

#[test]
fn claim_on_unknown_id_reports_false() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    assert!(!store.claim(RegistrationId::new(404)).unwrap());
}

#[test]
fn remove_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let created = store
        .create(
            &applicant("jana@farm.example"),
            &ApprovalToken::new("t1"),
            Timestamp::Logical(0),
            Timestamp::Logical(9),
        )
        .unwrap();
    store.remove(created.id).unwrap();
    store.remove(created.id).unwrap();
    assert!(store.list_pending().unwrap().is_empty());
}

#[test]
fn pending_lists_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store
        .create(&applicant("a@farm.example"), &ApprovalToken::new("t1"), Timestamp::Logical(10), Timestamp::Logical(99))
        .unwrap();
    store
        .create(&applicant("b@farm.example"), &ApprovalToken::new("t2"), Timestamp::Logical(30), Timestamp::Logical(99))
        .unwrap();
    store
        .create(&applicant("c@farm.example"), &ApprovalToken::new("t3"), Timestamp::Logical(20), Timestamp::Logical(99))
        .unwrap();

    let pending = store.list_pending().unwrap();
    let emails: Vec<&str> = pending.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, vec!["b@farm.example", "c@farm.example", "a@farm.example"]);
}

#[test]
fn worker_queries_filter_sort_and_window() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.insert(&worker("Karel", "Zima", "karel@farm.example", Some("Mechanic"))).unwrap();
    store.insert(&worker("Alena", "Bila", "alena@farm.example", Some("Agronomist"))).unwrap();
    store.insert(&worker("Marek", "Dvorak", "marek@farm.example", None)).unwrap();

    let all = WorkerQuery::from_raw(None, None, None);
    assert_eq!(store.count(&all).unwrap(), 3);

    let page = store.fetch(&all, 0, 2).unwrap();
    let last_names: Vec<&str> = page.iter().map(|w| w.last_name.as_str()).collect();
    assert_eq!(last_names, vec!["Bila", "Dvorak"]);

    let rest = store.fetch(&all, 2, 2).unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].last_name, "Zima");

    let descending = WorkerQuery::from_raw(None, Some("firstName"), Some("desc"));
    let ordered = store.fetch(&descending, 0, 10).unwrap();
    let first_names: Vec<&str> = ordered.iter().map(|w| w.first_name.as_str()).collect();
    assert_eq!(first_names, vec!["Marek", "Karel", "Alena"]);

    let searched = WorkerQuery::from_raw(Some("AGRONOM"), None, None);
    assert_eq!(store.count(&searched).unwrap(), 1);
    let hits = store.fetch(&searched, 0, 10).unwrap();
    assert_eq!(hits[0].first_name, "Alena");
}

#[test]
fn duplicate_worker_email_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.insert(&worker("Karel", "Zima", "karel@farm.example", None)).unwrap();
    let result = store.insert(&worker("Karla", "Zimova", "KAREL@farm.example", None));
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[test]
fn worker_update_and_delete_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let id = store.insert(&worker("Karel", "Zima", "karel@farm.example", None)).unwrap();

    let mut record = store.find(id).unwrap().unwrap();
    record.position = Some("Senior Mechanic".to_string());
    store.update(&record).unwrap();
    assert_eq!(
        store.find(id).unwrap().unwrap().position.as_deref(),
        Some("Senior Mechanic")
    );

    store.delete(id).unwrap();
    assert!(store.find(id).unwrap().is_none());
    assert!(matches!(store.delete(id), Err(StoreError::NotFound(_))));
}

#[test]
fn identity_directory_assigns_unique_ids() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let first = store
        .create_identity(&NewIdentity {
            email: "a@farm.example".to_string(),
            first_name: "Alena".to_string(),
            last_name: "Bila".to_string(),
            password_hash: "hash-a".to_string(),
            role: WORKER_ROLE.to_string(),
        })
        .unwrap();
    let second = store
        .create_identity(&NewIdentity {
            email: "b@farm.example".to_string(),
            first_name: "Karel".to_string(),
            last_name: "Zima".to_string(),
            password_hash: "hash-b".to_string(),
            role: WORKER_ROLE.to_string(),
        })
        .unwrap();
    assert_ne!(first, second);

    store.remove_identity(&first).unwrap();
    assert!(store.remove_identity(&first).is_err());
}

#[test]
fn duplicate_identity_email_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let identity = NewIdentity {
        email: "a@farm.example".to_string(),
        first_name: "Alena".to_string(),
        last_name: "Bila".to_string(),
        password_hash: "hash-a".to_string(),
        role: WORKER_ROLE.to_string(),
    };
    store.create_identity(&identity).unwrap();
    assert!(store.create_identity(&identity).is_err());
}

#[test]
fn reopened_store_sees_persisted_rows() {
    let dir = TempDir::new().unwrap();
    let id = {
        let store = open_store(&dir);
        store.insert(&worker("Karel", "Zima", "karel@farm.example", None)).unwrap()
    };
    let reopened = open_store(&dir);
    let record = reopened.find(id).unwrap().unwrap();
    assert_eq!(record.email, "karel@farm.example");
}
