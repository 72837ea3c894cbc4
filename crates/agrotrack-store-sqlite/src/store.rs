// crates/agrotrack-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Workforce Store
// Description: Durable registration, worker, and identity stores over SQLite.
// Purpose: Persist the approval workflow and roster with atomic decisions.
// Dependencies: agrotrack-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements the AgroTrack store interfaces over a single
//! `SQLite` database. The decision claim is a conditional `UPDATE` on the
//! processed flag, so concurrent decisions on one registration resolve to
//! exactly one winner at the database. Roster queries count before they
//! window and order by a closed column set, never by raw caller input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use agrotrack_core::ApprovalToken;
use agrotrack_core::IdentityDirectory;
use agrotrack_core::IdentityError;
use agrotrack_core::NewIdentity;
use agrotrack_core::NewRegistration;
use agrotrack_core::NewWorker;
use agrotrack_core::PendingRegistration;
use agrotrack_core::RegistrationId;
use agrotrack_core::RegistrationStore;
use agrotrack_core::SortDirection;
use agrotrack_core::StoreError;
use agrotrack_core::Timestamp;
use agrotrack_core::UserId;
use agrotrack_core::WorkerId;
use agrotrack_core::WorkerQuery;
use agrotrack_core::WorkerRecord;
use agrotrack_core::WorkerSortKey;
use agrotrack_core::WorkerStore;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` workforce store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A unique constraint was violated.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// A referenced record does not exist.
    #[error("sqlite store not found: {0}")]
    NotFound(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::Io(message)
            | SqliteStoreError::Db(message)
            | SqliteStoreError::VersionMismatch(message)
            | SqliteStoreError::Invalid(message) => Self::Store(message),
        }
    }
}

impl From<SqliteStoreError> for IdentityError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Conflict(message) => Self::Duplicate(message),
            SqliteStoreError::NotFound(message)
            | SqliteStoreError::Io(message)
            | SqliteStoreError::Db(message)
            | SqliteStoreError::VersionMismatch(message)
            | SqliteStoreError::Invalid(message) => Self::Directory(message),
        }
    }
}

/// Maps a `rusqlite` error, routing constraint violations to conflicts.
fn db_err(conflict_on: &str) -> impl Fn(rusqlite::Error) -> SqliteStoreError + '_ {
    move |err| match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            SqliteStoreError::Conflict(conflict_on.to_string())
        }
        _ => SqliteStoreError::Db(err.to_string()),
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed registration, worker, and identity stores.
///
/// # Invariants
/// - One shared connection serializes all access; the decision claim is a
///   conditional `UPDATE` and cannot double-fire.
/// - Roster `ORDER BY` columns come from the closed sort key set only.
#[derive(Clone)]
pub struct SqliteWorkforceStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteWorkforceStore {
    /// Opens a `SQLite`-backed workforce store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Registration Store
// ============================================================================

/// Column list shared by the registration queries.
const REGISTRATION_COLUMNS: &str = "id, first_name, last_name, email, phone_number, position, \
                                    password_hash, requested_at_kind, requested_at, \
                                    approval_token, expires_at_kind, expires_at, is_processed";

impl RegistrationStore for SqliteWorkforceStore {
    fn create(
        &self,
        registration: &NewRegistration,
        token: &ApprovalToken,
        requested_at: Timestamp,
        token_expires_at: Timestamp,
    ) -> Result<PendingRegistration, StoreError> {
        let (requested_kind, requested_value) = timestamp_columns(requested_at)?;
        let (expires_kind, expires_value) = timestamp_columns(token_expires_at)?;
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO registrations (first_name, last_name, email, phone_number, \
                 position, password_hash, requested_at_kind, requested_at, approval_token, \
                 expires_at_kind, expires_at, is_processed) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, \
                 ?8, ?9, ?10, ?11, 0)",
                params![
                    registration.first_name,
                    registration.last_name,
                    registration.email,
                    registration.phone_number,
                    registration.position,
                    registration.password_hash,
                    requested_kind,
                    requested_value,
                    token.as_str(),
                    expires_kind,
                    expires_value,
                ],
            )
            .map_err(db_err(&registration.email))?;
        let id = guard.last_insert_rowid();
        let id = u64::try_from(id)
            .map_err(|_| SqliteStoreError::Invalid(format!("negative rowid {id}")))?;
        Ok(PendingRegistration {
            id: RegistrationId::new(id),
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            email: registration.email.clone(),
            phone_number: registration.phone_number.clone(),
            position: registration.position.clone(),
            password_hash: registration.password_hash.clone(),
            requested_at,
            approval_token: token.clone(),
            token_expires_at,
            is_processed: false,
        })
    }

    fn find_by_token(
        &self,
        token: &ApprovalToken,
    ) -> Result<Option<PendingRegistration>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE approval_token = ?1 \
                     AND is_processed = 0"
                ),
                params![token.as_str()],
                read_registration_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        row.map(RawRegistration::into_registration).transpose().map_err(StoreError::from)
    }

    fn find_by_id(&self, id: RegistrationId) -> Result<Option<PendingRegistration>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = ?1 AND \
                     is_processed = 0"
                ),
                params![id.get()],
                read_registration_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        row.map(RawRegistration::into_registration).transpose().map_err(StoreError::from)
    }

    fn list_pending(&self) -> Result<Vec<PendingRegistration>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(&format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE is_processed = 0 ORDER \
                 BY requested_at DESC, id DESC"
            ))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![], read_registration_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut pending = Vec::new();
        for row in rows {
            let raw = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            pending.push(raw.into_registration().map_err(StoreError::from)?);
        }
        Ok(pending)
    }

    fn claim(&self, id: RegistrationId) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE registrations SET is_processed = 1 WHERE id = ?1 AND is_processed = 0",
                params![id.get()],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(changed == 1)
    }

    fn release(&self, id: RegistrationId) -> Result<(), StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute("UPDATE registrations SET is_processed = 0 WHERE id = ?1", params![id.get()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("registration {id}")).into());
        }
        Ok(())
    }

    fn remove(&self, id: RegistrationId) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute("DELETE FROM registrations WHERE id = ?1", params![id.get()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Worker Store
// ============================================================================

impl WorkerStore for SqliteWorkforceStore {
    fn insert(&self, worker: &NewWorker) -> Result<WorkerId, StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO workers (first_name, last_name, email, phone_number, position, \
                 user_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    worker.first_name,
                    worker.last_name,
                    worker.email,
                    worker.phone_number,
                    worker.position,
                    worker.user_id.as_str(),
                ],
            )
            .map_err(db_err(&worker.email))?;
        let id = guard.last_insert_rowid();
        let id = u64::try_from(id)
            .map_err(|_| SqliteStoreError::Invalid(format!("negative rowid {id}")))?;
        Ok(WorkerId::new(id))
    }

    fn find(&self, id: WorkerId) -> Result<Option<WorkerRecord>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                "SELECT id, first_name, last_name, email, phone_number, position, user_id FROM \
                 workers WHERE id = ?1",
                params![id.get()],
                read_worker_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(row)
    }

    fn update(&self, worker: &WorkerRecord) -> Result<(), StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE workers SET first_name = ?2, last_name = ?3, email = ?4, phone_number = \
                 ?5, position = ?6, user_id = ?7 WHERE id = ?1",
                params![
                    worker.id.get(),
                    worker.first_name,
                    worker.last_name,
                    worker.email,
                    worker.phone_number,
                    worker.position,
                    worker.user_id.as_str(),
                ],
            )
            .map_err(db_err(&worker.email))?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("worker {}", worker.id)).into());
        }
        Ok(())
    }

    fn delete(&self, id: WorkerId) -> Result<(), StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute("DELETE FROM workers WHERE id = ?1", params![id.get()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("worker {id}")).into());
        }
        Ok(())
    }

    fn count(&self, query: &WorkerQuery) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count: i64 = match search_pattern(query) {
            Some(pattern) => guard
                .query_row(
                    &format!("SELECT COUNT(*) FROM workers WHERE {SEARCH_PREDICATE}"),
                    params![pattern],
                    |row| row.get(0),
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?,
            None => guard
                .query_row("SELECT COUNT(*) FROM workers", params![], |row| row.get(0))
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?,
        };
        u64::try_from(count)
            .map_err(|_| SqliteStoreError::Invalid(format!("negative count {count}")).into())
    }

    fn fetch(
        &self,
        query: &WorkerQuery,
        skip: u64,
        take: u64,
    ) -> Result<Vec<WorkerRecord>, StoreError> {
        let order = order_clause(query.sort_key, query.direction);
        let guard = self.lock()?;
        let mut workers = Vec::new();
        match search_pattern(query) {
            Some(pattern) => {
                let mut statement = guard
                    .prepare(&format!(
                        "SELECT id, first_name, last_name, email, phone_number, position, \
                         user_id FROM workers WHERE {SEARCH_PREDICATE} ORDER BY {order} LIMIT ?2 \
                         OFFSET ?3"
                    ))
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                let rows = statement
                    .query_map(params![pattern, take, skip], read_worker_row)
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                for row in rows {
                    workers.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
                }
            }
            None => {
                let mut statement = guard
                    .prepare(&format!(
                        "SELECT id, first_name, last_name, email, phone_number, position, \
                         user_id FROM workers ORDER BY {order} LIMIT ?1 OFFSET ?2"
                    ))
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                let rows = statement
                    .query_map(params![take, skip], read_worker_row)
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                for row in rows {
                    workers.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
                }
            }
        }
        Ok(workers)
    }
}

/// Case-insensitive containment predicate over the searchable columns.
const SEARCH_PREDICATE: &str = "(instr(lower(first_name), ?1) > 0 OR instr(lower(last_name), \
                                ?1) > 0 OR instr(lower(email), ?1) > 0 OR instr(lower(coalesce(\
                                position, '')), ?1) > 0)";

/// Returns the lowered search term, when present and non-empty.
fn search_pattern(query: &WorkerQuery) -> Option<String> {
    query.search.as_deref().map(str::to_lowercase).filter(|term| !term.is_empty())
}

/// Builds the `ORDER BY` clause from the closed sort key set.
///
/// Raw caller input never reaches this function; the sort key is already
/// resolved to the closed enum.
fn order_clause(key: WorkerSortKey, direction: SortDirection) -> String {
    let column = match key {
        WorkerSortKey::Id => "id",
        WorkerSortKey::FirstName => "first_name",
        WorkerSortKey::LastName => "last_name",
        WorkerSortKey::Email => "email",
        WorkerSortKey::Position => "position",
    };
    let dir = match direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };
    format!("{column} {dir}, id ASC")
}

// ============================================================================
// SECTION: Identity Directory
// ============================================================================

impl IdentityDirectory for SqliteWorkforceStore {
    fn create_identity(&self, identity: &NewIdentity) -> Result<UserId, IdentityError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.execute(
            "INSERT INTO identities (user_id, email, first_name, last_name, password_hash, \
             role) VALUES ('', ?1, ?2, ?3, ?4, ?5)",
            params![
                identity.email,
                identity.first_name,
                identity.last_name,
                identity.password_hash,
                identity.role,
            ],
        )
        .map_err(db_err(&identity.email))?;
        let rowid = tx.last_insert_rowid();
        let user_id = format!("user-{rowid}");
        tx.execute("UPDATE identities SET user_id = ?1 WHERE id = ?2", params![user_id, rowid])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(UserId::new(user_id))
    }

    fn remove_identity(&self, user_id: &UserId) -> Result<(), IdentityError> {
        let guard = self.lock()?;
        let changed = guard
            .execute("DELETE FROM identities WHERE user_id = ?1", params![user_id.as_str()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("identity {user_id}")).into());
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Registration row before timestamp decoding.
struct RawRegistration {
    /// Raw rowid.
    id: i64,
    /// First name.
    first_name: String,
    /// Last name.
    last_name: String,
    /// Email.
    email: String,
    /// Optional phone number.
    phone_number: Option<String>,
    /// Optional position.
    position: Option<String>,
    /// Credential hash.
    password_hash: String,
    /// Requested-at timestamp kind.
    requested_kind: String,
    /// Requested-at timestamp value.
    requested_value: i64,
    /// Single-use decision token.
    approval_token: String,
    /// Expiry timestamp kind.
    expires_kind: String,
    /// Expiry timestamp value.
    expires_value: i64,
    /// Processed flag.
    is_processed: bool,
}

impl RawRegistration {
    /// Decodes the raw row into the canonical registration type.
    fn into_registration(self) -> Result<PendingRegistration, SqliteStoreError> {
        let id = u64::try_from(self.id)
            .map_err(|_| SqliteStoreError::Invalid(format!("negative rowid {}", self.id)))?;
        Ok(PendingRegistration {
            id: RegistrationId::new(id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            position: self.position,
            password_hash: self.password_hash,
            requested_at: timestamp_from_columns(&self.requested_kind, self.requested_value)?,
            approval_token: ApprovalToken::new(self.approval_token),
            token_expires_at: timestamp_from_columns(&self.expires_kind, self.expires_value)?,
            is_processed: self.is_processed,
        })
    }
}

/// Reads one registration row into its raw form.
fn read_registration_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRegistration> {
    Ok(RawRegistration {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
        position: row.get(5)?,
        password_hash: row.get(6)?,
        requested_kind: row.get(7)?,
        requested_value: row.get(8)?,
        approval_token: row.get(9)?,
        expires_kind: row.get(10)?,
        expires_value: row.get(11)?,
        is_processed: row.get(12)?,
    })
}

/// Reads one worker row.
fn read_worker_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkerRecord> {
    let id: i64 = row.get(0)?;
    let id = u64::try_from(id).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(err))
    })?;
    let user_id: String = row.get(6)?;
    Ok(WorkerRecord {
        id: WorkerId::new(id),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
        position: row.get(5)?,
        user_id: UserId::new(user_id),
    })
}

// ============================================================================
// SECTION: Timestamp Columns
// ============================================================================

/// Timestamp kind label for unix milliseconds.
const KIND_UNIX_MILLIS: &str = "unix_millis";
/// Timestamp kind label for logical time.
const KIND_LOGICAL: &str = "logical";

/// Splits a timestamp into its kind label and integer value.
fn timestamp_columns(value: Timestamp) -> Result<(&'static str, i64), SqliteStoreError> {
    match value {
        Timestamp::UnixMillis(millis) => Ok((KIND_UNIX_MILLIS, millis)),
        Timestamp::Logical(tick) => {
            let tick = i64::try_from(tick).map_err(|_| {
                SqliteStoreError::Invalid(format!("logical timestamp {tick} exceeds storage"))
            })?;
            Ok((KIND_LOGICAL, tick))
        }
    }
}

/// Rebuilds a timestamp from its stored kind label and value.
fn timestamp_from_columns(kind: &str, value: i64) -> Result<Timestamp, SqliteStoreError> {
    match kind {
        KIND_UNIX_MILLIS => Ok(Timestamp::UnixMillis(value)),
        KIND_LOGICAL => {
            let tick = u64::try_from(value).map_err(|_| {
                SqliteStoreError::Invalid(format!("negative logical timestamp {value}"))
            })?;
            Ok(Timestamp::Logical(tick))
        }
        other => Err(SqliteStoreError::Invalid(format!("unknown timestamp kind: {other}"))),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens a `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS registrations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    email TEXT NOT NULL COLLATE NOCASE,
                    phone_number TEXT,
                    position TEXT,
                    password_hash TEXT NOT NULL,
                    requested_at_kind TEXT NOT NULL,
                    requested_at INTEGER NOT NULL,
                    approval_token TEXT NOT NULL UNIQUE,
                    expires_at_kind TEXT NOT NULL,
                    expires_at INTEGER NOT NULL,
                    is_processed INTEGER NOT NULL DEFAULT 0
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_registrations_pending_email
                    ON registrations (email) WHERE is_processed = 0;
                CREATE TABLE IF NOT EXISTS workers (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                    phone_number TEXT,
                    position TEXT,
                    user_id TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS identities (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    role TEXT NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
