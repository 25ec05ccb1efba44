//! The engine handle: one object per installation exposing the whole
//! password-manager surface.
//!
//! Clients build an `Engine` once at startup and share it (it is
//! `Send + Sync`; wrap it in an `Arc` to hand it to several threads).
//! Every call is blocking.  `set_master_key`, `is_master_key_correct`,
//! `save_password` and `get_password` run Argon2id and take hundreds of
//! milliseconds with the default parameters, so keep them off any
//! rendering thread.

use std::path::Path;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::Result;
use crate::generator::PasswordGenerator;
use crate::master_key::MasterKeyManager;
use crate::storage::{open_backend, StorageBackend};
use crate::vault::{EntryMetadata, VaultLimits, VaultStore};

pub struct Engine {
    settings: Settings,
    backend: Arc<dyn StorageBackend>,
    master: MasterKeyManager,
    vault: VaultStore,
    generator: PasswordGenerator,
}

impl Engine {
    /// Open the installation in `data_dir` with the backend chosen in
    /// `settings`.
    pub fn open(settings: Settings, data_dir: &Path) -> Result<Self> {
        settings.validate()?;
        let backend = open_backend(&settings, data_dir)?;
        tracing::debug!(
            backend = %backend.kind(),
            location = %backend.location().display(),
            "opened storage"
        );
        Self::with_backend(settings, backend)
    }

    /// Build an engine on top of an already-opened backend.
    pub fn with_backend(settings: Settings, backend: Arc<dyn StorageBackend>) -> Result<Self> {
        settings.validate()?;
        let params = settings.argon2_params();

        let master = MasterKeyManager::new(backend.clone(), settings.max_master_key_len, params);
        let vault = VaultStore::new(
            backend.clone(),
            VaultLimits {
                max_name_len: settings.max_name_len,
                max_password_len: settings.max_password_len,
            },
            params,
        );
        let generator = PasswordGenerator::new(settings.generated_length);

        Ok(Self {
            settings,
            backend,
            master,
            vault,
            generator,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    // ------------------------------------------------------------------
    // Master key
    // ------------------------------------------------------------------

    pub fn is_master_key_set(&self) -> Result<bool> {
        self.master.is_set()
    }

    /// One-time setup.  Fails with `AlreadySet` once a key exists.
    pub fn set_master_key(&self, candidate: &str) -> Result<()> {
        self.master.set_master_key(candidate)
    }

    /// `false` for both "wrong key" and "no key set yet".
    pub fn is_master_key_correct(&self, candidate: &str) -> Result<bool> {
        self.master.is_master_key_correct(candidate)
    }

    // ------------------------------------------------------------------
    // Vault
    // ------------------------------------------------------------------

    /// Names of all stored passwords, in insertion order.
    pub fn get_password_list(&self) -> Result<Vec<String>> {
        self.vault.list()
    }

    /// Names with creation and update times.
    pub fn get_password_metadata(&self) -> Result<Vec<EntryMetadata>> {
        self.vault.list_metadata()
    }

    pub fn generate_password(&self) -> Result<Zeroizing<String>> {
        self.generator.generate()
    }

    /// Encrypt `plaintext` under `master_key` and store it as `name`,
    /// overwriting any entry of the same name.
    ///
    /// The key is not checked against the master-key record here;
    /// callers verify it with `is_master_key_correct` first.
    pub fn save_password(&self, master_key: &str, name: &str, plaintext: &str) -> Result<()> {
        self.vault.save(master_key, name, plaintext)
    }

    pub fn get_password(&self, master_key: &str, name: &str) -> Result<Zeroizing<String>> {
        self.vault.get(master_key, name)
    }

    pub fn delete_password(&self, name: &str) -> Result<()> {
        self.vault.delete(name)
    }

    pub fn contains_password(&self, name: &str) -> Result<bool> {
        self.vault.contains(name)
    }
}
