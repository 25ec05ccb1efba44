//! High-level vault operations.
//!
//! `VaultStore` wraps a `StorageBackend` and the crypto layer so that
//! callers work with plain calls like `store.save(key, "github", "p@ss")`.
//! The master key is passed on every call that needs it and is never
//! kept: each call derives, uses and zeroes its own keys.

use std::sync::Arc;

use chrono::Utc;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{decrypt, derive_key, encrypt, generate_salt, Argon2Params, EntryRootKey};
use crate::errors::{NengPassError, Result, ValidationError};
use crate::storage::StorageBackend;

use super::entry::{EntryMetadata, VaultEntry, VaultKdf};

/// Field limits enforced by the vault, in characters.
#[derive(Debug, Clone, Copy)]
pub struct VaultLimits {
    pub max_name_len: usize,
    pub max_password_len: usize,
}

/// The vault handle.  Cheap to clone the backend into; holds no secrets.
pub struct VaultStore {
    backend: Arc<dyn StorageBackend>,
    limits: VaultLimits,
    argon2_params: Argon2Params,
}

impl VaultStore {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        limits: VaultLimits,
        argon2_params: Argon2Params,
    ) -> Self {
        Self {
            backend,
            limits,
            argon2_params,
        }
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// All entry names, in insertion order.  Needs no master key.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .backend
            .list_entries()?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    /// Metadata for all entries, in insertion order.
    pub fn list_metadata(&self) -> Result<Vec<EntryMetadata>> {
        self.backend.list_entries()
    }

    /// Returns `true` if the vault has an entry called `name`.
    ///
    /// Metadata-only check; nothing is decrypted.
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.backend.load_entry(name)?.is_some())
    }

    /// Encrypt `plaintext` and store it under `name`, replacing any
    /// existing entry with that name.
    ///
    /// Validation happens before any key derivation or storage access,
    /// so a rejected call leaves the vault untouched.
    pub fn save(&self, master_key: &str, name: &str, plaintext: &str) -> Result<()> {
        self.validate_name(name)?;
        self.validate_password(plaintext)?;

        let kdf = self.vault_kdf()?;
        let root = derive_key(master_key, &kdf.salt, &kdf.argon2_params)?;
        let entry_key = root.entry_key(name)?;
        drop(root);

        let (ciphertext, nonce) = encrypt(&entry_key[..], plaintext.as_bytes())?;
        drop(entry_key);

        let now = Utc::now();
        let entry = VaultEntry {
            name: name.to_string(),
            ciphertext,
            nonce: nonce.to_vec(),
            created_at: now,
            updated_at: now,
        };
        self.backend.upsert_entry(&entry)?;

        tracing::info!(name, "saved password");
        Ok(())
    }

    /// Decrypt and return the password stored under `name`.
    ///
    /// Fails with `NotFound` if there is no such entry and with
    /// `AuthenticationFailure` if the master key is wrong or the entry
    /// was tampered with.
    pub fn get(&self, master_key: &str, name: &str) -> Result<Zeroizing<String>> {
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let entry = self
            .backend
            .load_entry(name)?
            .ok_or_else(|| NengPassError::NotFound(name.to_string()))?;

        // An entry exists, so the vault KDF record was written before it.
        let kdf = self.backend.load_vault_kdf()?.ok_or_else(|| {
            NengPassError::InvalidFormat("vault has entries but no key-derivation record".into())
        })?;

        let root = derive_key(master_key, &kdf.salt, &kdf.argon2_params)?;
        let plaintext = Self::open_entry(&root, &entry).inspect_err(|e| {
            if matches!(e, NengPassError::AuthenticationFailure) {
                tracing::warn!(name, "entry failed authentication");
            }
        })?;

        tracing::debug!(name, "decrypted password");
        Ok(plaintext)
    }

    /// Remove the entry called `name`.
    ///
    /// Fails with `NotFound` if no such entry exists, including when it
    /// was already deleted.
    pub fn delete(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.backend.remove_entry(name)? {
            return Err(NengPassError::NotFound(name.to_string()));
        }
        tracing::info!(name, "deleted password");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// The vault's KDF record, created on first use.
    fn vault_kdf(&self) -> Result<VaultKdf> {
        if let Some(kdf) = self.backend.load_vault_kdf()? {
            return Ok(kdf);
        }
        let candidate = VaultKdf {
            salt: generate_salt()?.to_vec(),
            argon2_params: self.argon2_params,
            created_at: Utc::now(),
        };
        self.backend.init_vault_kdf(&candidate)
    }

    fn open_entry(root: &EntryRootKey, entry: &VaultEntry) -> Result<Zeroizing<String>> {
        let entry_key = root.entry_key(&entry.name)?;
        let mut bytes = decrypt(&entry_key[..], &entry.ciphertext, &entry.nonce)?;

        // Take the bytes out of the wrapper without leaving a copy behind.
        let owned = std::mem::take(&mut *bytes);
        String::from_utf8(owned).map(Zeroizing::new).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            NengPassError::InvalidFormat("decrypted password is not valid UTF-8".into())
        })
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if name.chars().count() > self.limits.max_name_len {
            return Err(ValidationError::NameTooLong {
                max: self.limits.max_name_len,
            }
            .into());
        }
        Ok(())
    }

    fn validate_password(&self, plaintext: &str) -> Result<()> {
        if plaintext.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        if plaintext.chars().count() > self.limits.max_password_len {
            return Err(ValidationError::ValueTooLong {
                max: self.limits.max_password_len,
            }
            .into());
        }
        Ok(())
    }
}
