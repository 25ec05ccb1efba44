//! Two-file storage backend.
//!
//! Layout inside the data directory:
//!
//! ```text
//! master_key   NPMK envelope, body = MasterKeyRecord JSON
//! vault        NPVT envelope, body = { "kdf": VaultKdf?, "entries": [VaultEntry] }
//! .lock        empty file, exclusively locked by every writer
//! ```
//!
//! Writers take an `fs2` exclusive lock on `.lock`, re-read the current
//! file, modify it, and replace it with `format::atomic_write`.  Readers
//! read without locking; the rename guarantees they see a whole file.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use super::format::{self, MASTER_MAGIC, VAULT_MAGIC};
use super::{parse_body, StorageBackend};
use crate::config::BackendKind;
use crate::errors::{NengPassError, Result, ValidationError};
use crate::master_key::MasterKeyRecord;
use crate::vault::{EntryMetadata, VaultEntry, VaultKdf};

const MASTER_FILE: &str = "master_key";
const VAULT_FILE: &str = "vault";
const LOCK_FILE: &str = ".lock";

/// Body of the vault file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct VaultBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kdf: Option<VaultKdf>,

    /// Entries in insertion order.
    #[serde(default)]
    entries: Vec<VaultEntry>,
}

/// Holds the exclusive write lock until dropped.
struct WriteLock {
    file: File,
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// File-based `StorageBackend`.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    master_path: PathBuf,
    vault_path: PathBuf,
    lock_path: PathBuf,
}

impl FileBackend {
    /// Open (and create if needed) the data directory at `dir`.
    ///
    /// A directory created here is owner-only; an existing one keeps
    /// its mode.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        builder.create(dir)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            master_path: dir.join(MASTER_FILE),
            vault_path: dir.join(VAULT_FILE),
            lock_path: dir.join(LOCK_FILE),
        })
    }

    /// Path of the master-key record file.
    pub fn master_path(&self) -> &Path {
        &self.master_path
    }

    /// Path of the vault file.
    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    /// Block until this process holds the exclusive write lock.
    fn lock(&self) -> Result<WriteLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        file.lock_exclusive()?;
        tracing::debug!(path = %self.lock_path.display(), "acquired write lock");
        Ok(WriteLock { file })
    }

    fn read_vault(&self) -> Result<VaultBody> {
        let Some(envelope) = format::read_envelope(&self.vault_path, VAULT_MAGIC)? else {
            return Ok(VaultBody::default());
        };
        // Version 1 is the only body format so far; older versions
        // would be migrated here.
        match envelope.version {
            1 => parse_body("vault", &envelope.body),
            found => Err(NengPassError::UnsupportedVersion {
                found,
                supported: format::CURRENT_VERSION,
            }),
        }
    }

    fn write_vault(&self, body: &VaultBody) -> Result<()> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| NengPassError::SerializationError(format!("vault: {e}")))?;
        format::atomic_write(&self.vault_path, &format::encode_envelope(VAULT_MAGIC, &bytes))
    }
}

impl StorageBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn location(&self) -> &Path {
        &self.dir
    }

    fn load_master_record(&self) -> Result<Option<MasterKeyRecord>> {
        let Some(envelope) = format::read_envelope(&self.master_path, MASTER_MAGIC)? else {
            return Ok(None);
        };
        match envelope.version {
            1 => parse_body("master key", &envelope.body).map(Some),
            found => Err(NengPassError::UnsupportedVersion {
                found,
                supported: format::CURRENT_VERSION,
            }),
        }
    }

    fn store_master_record(&self, record: &MasterKeyRecord) -> Result<()> {
        let _lock = self.lock()?;

        if self.master_path.exists() {
            return Err(ValidationError::AlreadySet.into());
        }

        let bytes = serde_json::to_vec(record)
            .map_err(|e| NengPassError::SerializationError(format!("master key: {e}")))?;
        format::atomic_write(
            &self.master_path,
            &format::encode_envelope(MASTER_MAGIC, &bytes),
        )
    }

    fn load_vault_kdf(&self) -> Result<Option<VaultKdf>> {
        Ok(self.read_vault()?.kdf)
    }

    fn init_vault_kdf(&self, candidate: &VaultKdf) -> Result<VaultKdf> {
        let _lock = self.lock()?;

        let mut body = self.read_vault()?;
        if let Some(existing) = body.kdf {
            return Ok(existing);
        }

        body.kdf = Some(candidate.clone());
        self.write_vault(&body)?;
        Ok(candidate.clone())
    }

    fn list_entries(&self) -> Result<Vec<EntryMetadata>> {
        Ok(self
            .read_vault()?
            .entries
            .iter()
            .map(VaultEntry::metadata)
            .collect())
    }

    fn load_entry(&self, name: &str) -> Result<Option<VaultEntry>> {
        Ok(self
            .read_vault()?
            .entries
            .into_iter()
            .find(|e| e.name == name))
    }

    fn upsert_entry(&self, entry: &VaultEntry) -> Result<()> {
        let _lock = self.lock()?;

        let mut body = self.read_vault()?;
        match body.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => {
                existing.ciphertext = entry.ciphertext.clone();
                existing.nonce = entry.nonce.clone();
                existing.updated_at = entry.updated_at;
            }
            None => body.entries.push(entry.clone()),
        }

        self.write_vault(&body)
    }

    fn remove_entry(&self, name: &str) -> Result<bool> {
        let _lock = self.lock()?;

        let mut body = self.read_vault()?;
        let before = body.entries.len();
        body.entries.retain(|e| e.name != name);
        if body.entries.len() == before {
            return Ok(false);
        }

        self.write_vault(&body)?;
        Ok(true)
    }
}
