// crates/spine-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Proof Bundle Store
// Description: Durable ProofBundleStore backed by SQLite WAL.
// Purpose: Persist proof bundles append-only with deterministic serialization.
// Dependencies: rusqlite, serde_json, spine-core, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ProofBundleStore`] using `SQLite`. Each
//! put stores the canonical JSON snapshot of a bundle under its
//! content-addressed identifier, together with an attempt row that
//! deduplicates retried submissions. Loads recompute the digest from the
//! stored snapshot and fail closed on any mismatch. No update or delete
//! statement exists in this module; attested bundles are immutable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use spine_core::AttemptId;
use spine_core::ProofBundle;
use spine_core::ProofBundleId;
use spine_core::ProofBundleStore;
use spine_core::StoreError;
use spine_core::hashing::canonical_json_bytes;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum bundle snapshot size accepted by the store.
pub const MAX_BUNDLE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while opening or migrating the store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Underlying `SQLite` error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Stored schema version is incompatible with this build.
    #[error("sqlite schema version mismatch: found {found}, expected {expected}")]
    SchemaVersion {
        /// Version found in the database.
        found: i64,
        /// Version expected by this build.
        expected: i64,
    },
}

// ============================================================================
// SECTION: SQLite Store
// ============================================================================

/// Durable proof bundle store backed by `SQLite`.
pub struct SqliteProofBundleStore {
    /// Database connection protected by a mutex.
    conn: Mutex<Connection>,
}

impl SqliteProofBundleStore {
    /// Opens (or creates) a store at the provided path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or the
    /// schema cannot be migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteStoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory store for tests and demos.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be created.
    pub fn in_memory() -> Result<Self, SqliteStoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Applies shared pragmas and migrations to a fresh connection.
    fn from_connection(conn: Connection) -> Result<Self, SqliteStoreError> {
        conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Locks the connection, mapping poisoning to a store error.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Store("sqlite connection mutex poisoned".to_string()))
    }
}

impl ProofBundleStore for SqliteProofBundleStore {
    fn put(
        &self,
        bundle: &ProofBundle,
        attempt_id: &AttemptId,
    ) -> Result<ProofBundleId, StoreError> {
        let verified = bundle.verify().map_err(|err| StoreError::Invalid(err.to_string()))?;
        if !verified {
            return Err(StoreError::Invalid(
                "bundle integrity digest does not match its items".to_string(),
            ));
        }
        let bundle_id = bundle.bundle_id();
        let snapshot =
            canonical_json_bytes(bundle).map_err(|err| StoreError::Invalid(err.to_string()))?;
        if snapshot.len() > MAX_BUNDLE_BYTES {
            return Err(StoreError::Invalid(format!(
                "bundle snapshot exceeds size limit: {} bytes (max {MAX_BUNDLE_BYTES})",
                snapshot.len()
            )));
        }

        let mut guard = self.lock_conn()?;
        let tx = guard.transaction().map_err(|err| StoreError::Io(err.to_string()))?;

        let recorded: Option<String> = tx
            .query_row(
                "SELECT bundle_id FROM decision_attempts WHERE attempt_id = ?1",
                params![attempt_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        if let Some(existing) = recorded
            && existing != bundle_id.as_str()
        {
            return Err(StoreError::Conflict(format!(
                "attempt {attempt_id} already recorded bundle {existing}"
            )));
        }

        tx.execute(
            "INSERT OR IGNORE INTO proof_bundles (bundle_id, canonical_json, sha256)
             VALUES (?1, ?2, ?3)",
            params![bundle_id.as_str(), snapshot, bundle.integrity.sha256],
        )
        .map_err(|err| StoreError::Io(err.to_string()))?;
        tx.execute(
            "INSERT OR IGNORE INTO decision_attempts (attempt_id, bundle_id) VALUES (?1, ?2)",
            params![attempt_id.as_str(), bundle_id.as_str()],
        )
        .map_err(|err| StoreError::Io(err.to_string()))?;

        tx.commit().map_err(|err| StoreError::Io(err.to_string()))?;
        drop(guard);
        Ok(bundle_id)
    }

    fn get(&self, id: &ProofBundleId) -> Result<Option<ProofBundle>, StoreError> {
        let guard = self.lock_conn()?;
        let row: Option<(Vec<u8>, String)> = guard
            .query_row(
                "SELECT canonical_json, sha256 FROM proof_bundles WHERE bundle_id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        drop(guard);

        let Some((snapshot, stored_sha256)) = row else {
            return Ok(None);
        };
        let bundle: ProofBundle = serde_json::from_slice(&snapshot)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        let recomputed = bundle
            .recompute_integrity()
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        if recomputed.sha256 != stored_sha256 || recomputed.sha256 != id.as_str() {
            return Err(StoreError::Corrupt(format!(
                "stored bundle digest mismatch for {id}"
            )));
        }
        Ok(Some(bundle))
    }
}

// ============================================================================
// SECTION: Migrations
// ============================================================================

/// Creates the schema and records the version; rejects incompatible stores.
fn migrate(conn: &Connection) -> Result<(), SqliteStoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_meta (
             version INTEGER NOT NULL
         );
         CREATE TABLE IF NOT EXISTS proof_bundles (
             bundle_id TEXT PRIMARY KEY,
             canonical_json BLOB NOT NULL,
             sha256 TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS decision_attempts (
             attempt_id TEXT PRIMARY KEY,
             bundle_id TEXT NOT NULL REFERENCES proof_bundles (bundle_id)
         );",
    )?;

    let version: Option<i64> = conn
        .query_row("SELECT version FROM schema_meta LIMIT 1", [], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            conn.execute("INSERT INTO schema_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            Ok(())
        }
        Some(found) if found == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SqliteStoreError::SchemaVersion {
            found,
            expected: SCHEMA_VERSION,
        }),
    }
}
