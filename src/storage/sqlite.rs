//! SQLite storage backend.
//!
//! One database file holds three tables:
//!
//! ```text
//! master_key (id = 1, salt, verifier, argon2 params, created_at)
//! vault_kdf  (id = 1, salt, argon2 params, created_at)
//! entries    (id AUTOINCREMENT, name UNIQUE, ciphertext, nonce, created_at, updated_at)
//! ```
//!
//! The schema version lives in `PRAGMA user_version`.  Mutations run in
//! `BEGIN IMMEDIATE` transactions, so the read-modify-write of each call
//! holds SQLite's write lock and commits all-or-nothing.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::StorageBackend;
use crate::config::BackendKind;
use crate::crypto::Argon2Params;
use crate::errors::{NengPassError, Result, ValidationError};
use crate::master_key::MasterKeyRecord;
use crate::vault::{EntryMetadata, VaultEntry, VaultKdf};

/// Current schema version.
const SCHEMA_VERSION: u8 = 1;

/// How long a writer waits for another connection's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const SCHEMA_V1: &str = "
CREATE TABLE master_key (
    id          INTEGER PRIMARY KEY CHECK (id = 1),
    salt        BLOB NOT NULL,
    verifier    BLOB NOT NULL,
    memory_kib  INTEGER NOT NULL,
    iterations  INTEGER NOT NULL,
    parallelism INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE TABLE vault_kdf (
    id          INTEGER PRIMARY KEY CHECK (id = 1),
    salt        BLOB NOT NULL,
    memory_kib  INTEGER NOT NULL,
    iterations  INTEGER NOT NULL,
    parallelism INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE TABLE entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    ciphertext  BLOB NOT NULL,
    nonce       BLOB NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
";

/// SQLite-backed `StorageBackend`.
pub struct SqliteBackend {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Database file name inside the data directory.
    pub const FILE_NAME: &'static str = "vault.sqlite3";

    /// Open (or create) the database at `path` and bring its schema up
    /// to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Owner-only permissions on the database file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        let backend = Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        };
        backend.migrate()?;
        Ok(backend)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| std::io::Error::other("sqlite connection mutex poisoned").into())
    }

    /// Create or upgrade the schema.  Future versions add arms here.
    fn migrate(&self) -> Result<()> {
        let mut conn = self.conn()?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let version: u8 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        match version {
            0 => {
                tx.execute_batch(SCHEMA_V1)?;
                tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
                tracing::info!(path = %self.path.display(), "created vault database");
            }
            SCHEMA_VERSION => {}
            found => {
                return Err(NengPassError::UnsupportedVersion {
                    found,
                    supported: SCHEMA_VERSION,
                })
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn read_params(row: &rusqlite::Row<'_>, first: usize) -> rusqlite::Result<Argon2Params> {
    Ok(Argon2Params {
        memory_kib: row.get(first)?,
        iterations: row.get(first + 1)?,
        parallelism: row.get(first + 2)?,
    })
}

impl StorageBackend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn load_master_record(&self) -> Result<Option<MasterKeyRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT salt, verifier, memory_kib, iterations, parallelism, created_at
                 FROM master_key WHERE id = 1",
                [],
                |row| {
                    Ok(MasterKeyRecord {
                        salt: row.get(0)?,
                        verifier: row.get(1)?,
                        argon2_params: read_params(row, 2)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn store_master_record(&self, record: &MasterKeyRecord) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool =
            tx.query_row("SELECT EXISTS(SELECT 1 FROM master_key)", [], |row| row.get(0))?;
        if exists {
            return Err(ValidationError::AlreadySet.into());
        }

        tx.execute(
            "INSERT INTO master_key (id, salt, verifier, memory_kib, iterations, parallelism, created_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.salt,
                record.verifier,
                record.argon2_params.memory_kib,
                record.argon2_params.iterations,
                record.argon2_params.parallelism,
                record.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_vault_kdf(&self) -> Result<Option<VaultKdf>> {
        let conn = self.conn()?;
        let kdf = conn
            .query_row(
                "SELECT salt, memory_kib, iterations, parallelism, created_at
                 FROM vault_kdf WHERE id = 1",
                [],
                |row| {
                    Ok(VaultKdf {
                        salt: row.get(0)?,
                        argon2_params: read_params(row, 1)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(kdf)
    }

    fn init_vault_kdf(&self, candidate: &VaultKdf) -> Result<VaultKdf> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT OR IGNORE INTO vault_kdf (id, salt, memory_kib, iterations, parallelism, created_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)",
            params![
                candidate.salt,
                candidate.argon2_params.memory_kib,
                candidate.argon2_params.iterations,
                candidate.argon2_params.parallelism,
                candidate.created_at,
            ],
        )?;
        let kdf = tx.query_row(
            "SELECT salt, memory_kib, iterations, parallelism, created_at
             FROM vault_kdf WHERE id = 1",
            [],
            |row| {
                Ok(VaultKdf {
                    salt: row.get(0)?,
                    argon2_params: read_params(row, 1)?,
                    created_at: row.get(4)?,
                })
            },
        )?;
        tx.commit()?;
        Ok(kdf)
    }

    fn list_entries(&self) -> Result<Vec<EntryMetadata>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name, created_at, updated_at FROM entries ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(EntryMetadata {
                name: row.get(0)?,
                created_at: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;

        let mut list = Vec::new();
        for row in rows {
            list.push(row?);
        }
        Ok(list)
    }

    fn load_entry(&self, name: &str) -> Result<Option<VaultEntry>> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                "SELECT name, ciphertext, nonce, created_at, updated_at
                 FROM entries WHERE name = ?1",
                params![name],
                |row| {
                    Ok(VaultEntry {
                        name: row.get(0)?,
                        ciphertext: row.get(1)?,
                        nonce: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn upsert_entry(&self, entry: &VaultEntry) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO entries (name, ciphertext, nonce, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                 ciphertext = excluded.ciphertext,
                 nonce      = excluded.nonce,
                 updated_at = excluded.updated_at",
            params![
                entry.name,
                entry.ciphertext,
                entry.nonce,
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove_entry(&self, name: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM entries WHERE name = ?1", params![name])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}
