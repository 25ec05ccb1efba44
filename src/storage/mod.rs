//! Durable storage of the master-key record and the vault.
//!
//! This module provides:
//! - The `StorageBackend` trait, the only way the master-key manager and
//!   the vault store touch persisted state
//! - The versioned envelope format and atomic replace (`format`)
//! - A two-file backend with cross-process locking (`file`)
//! - A SQLite backend (`sqlite`, behind the `sqlite` feature)
//!
//! Every mutating method is a complete read-modify-write under the
//! backend's exclusive write lock, committed atomically.  Reads take no
//! lock and observe only committed state.

pub mod file;
pub mod format;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::path::Path;
use std::sync::Arc;

use crate::config::{BackendKind, Settings};
use crate::errors::{NengPassError, Result};
use crate::master_key::MasterKeyRecord;
use crate::vault::{EntryMetadata, VaultEntry, VaultKdf};

pub use file::FileBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;

/// Persistence for one installation.
pub trait StorageBackend: Send + Sync {
    /// Which layout this backend uses.
    fn kind(&self) -> BackendKind;

    /// Where the data lives (directory or database file).
    fn location(&self) -> &Path;

    /// The master-key record, if one has been set.
    fn load_master_record(&self) -> Result<Option<MasterKeyRecord>>;

    /// Persist the master-key record.
    ///
    /// Fails with `ValidationError::AlreadySet` if a record already
    /// exists; the check and the write happen under one lock.
    fn store_master_record(&self, record: &MasterKeyRecord) -> Result<()>;

    /// The vault's key-derivation record, if the vault has one yet.
    fn load_vault_kdf(&self) -> Result<Option<VaultKdf>>;

    /// Return the vault's key-derivation record, storing `candidate`
    /// first if none exists.  Concurrent callers all get the same record.
    fn init_vault_kdf(&self, candidate: &VaultKdf) -> Result<VaultKdf>;

    /// Metadata of every entry, in insertion order.
    fn list_entries(&self) -> Result<Vec<EntryMetadata>>;

    /// The entry called `name`, if any.
    fn load_entry(&self, name: &str) -> Result<Option<VaultEntry>>;

    /// Insert `entry`, or replace the entry with the same name.
    ///
    /// A replaced entry keeps its position and its `created_at`; its
    /// ciphertext, nonce and `updated_at` come from `entry`.
    fn upsert_entry(&self, entry: &VaultEntry) -> Result<()>;

    /// Remove the entry called `name`.  Returns whether it existed.
    fn remove_entry(&self, name: &str) -> Result<bool>;
}

/// Open the backend selected in `settings` under `data_dir`.
pub fn open_backend(settings: &Settings, data_dir: &Path) -> Result<Arc<dyn StorageBackend>> {
    match settings.backend {
        BackendKind::File => Ok(Arc::new(FileBackend::open(data_dir)?)),
        #[cfg(feature = "sqlite")]
        BackendKind::Sqlite => Ok(Arc::new(SqliteBackend::open(
            &data_dir.join(SqliteBackend::FILE_NAME),
        )?)),
        #[cfg(not(feature = "sqlite"))]
        BackendKind::Sqlite => Err(NengPassError::ConfigError(
            "this build has no sqlite backend — rebuild with the `sqlite` feature".into(),
        )),
    }
}

/// Decode a JSON body that passed the envelope checks.
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(what: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| NengPassError::InvalidFormat(format!("{what} JSON: {e}")))
}
