//! The master-key verification record and the operations on it.
//!
//! The record stores a random salt and a verifier derived from
//! (master key, salt); the master key itself is never persisted.  An
//! installation moves from "no record" to "record set" exactly once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{compute_verifier, generate_salt, verifier_matches, Argon2Params};
use crate::errors::{Result, ValidationError};
use crate::storage::format::{base64_decode, base64_encode};
use crate::storage::StorageBackend;

/// The persisted master-key verification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterKeyRecord {
    /// Per-installation random salt.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// One-way function of (master key, salt).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub verifier: Vec<u8>,

    /// Argon2 params used to compute `verifier`.
    pub argon2_params: Argon2Params,

    /// When the master key was set.
    pub created_at: DateTime<Utc>,
}

/// Owns the master-key record: set it once, check candidates against it.
pub struct MasterKeyManager {
    backend: Arc<dyn StorageBackend>,
    max_key_len: usize,
    argon2_params: Argon2Params,
}

impl MasterKeyManager {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        max_key_len: usize,
        argon2_params: Argon2Params,
    ) -> Self {
        Self {
            backend,
            max_key_len,
            argon2_params,
        }
    }

    /// True iff a master-key record exists in storage.
    pub fn is_set(&self) -> Result<bool> {
        Ok(self.backend.load_master_record()?.is_some())
    }

    /// Set the master key for this installation.
    ///
    /// Fails with `EmptyKey`/`KeyTooLong` on bad input and `AlreadySet`
    /// if a record exists.  The record is written atomically before this
    /// returns.  Blocking: runs Argon2id once.
    pub fn set_master_key(&self, candidate: &str) -> Result<()> {
        self.validate(candidate)?;

        // Cheap early exit; the backend re-checks under its write lock.
        if self.is_set()? {
            return Err(ValidationError::AlreadySet.into());
        }

        let salt = generate_salt()?;
        let verifier = compute_verifier(candidate, &salt, &self.argon2_params)?;

        let record = MasterKeyRecord {
            salt: salt.to_vec(),
            verifier: verifier.to_vec(),
            argon2_params: self.argon2_params,
            created_at: Utc::now(),
        };
        self.backend.store_master_record(&record)?;

        tracing::info!(location = %self.backend.location().display(), "master key set");
        Ok(())
    }

    /// Check `candidate` against the stored record in constant time.
    ///
    /// Returns `Ok(false)` both when no record exists and on mismatch.
    /// Storage and key-derivation failures are still reported as errors.
    pub fn is_master_key_correct(&self, candidate: &str) -> Result<bool> {
        let Some(record) = self.backend.load_master_record()? else {
            tracing::debug!("master key checked before one was set");
            return Ok(false);
        };

        let computed: Zeroizing<[u8; 32]> =
            compute_verifier(candidate, &record.salt, &record.argon2_params)?;
        let matches = verifier_matches(&computed[..], &record.verifier);

        if !matches {
            tracing::debug!("master key mismatch");
        }
        Ok(matches)
    }

    fn validate(&self, candidate: &str) -> Result<()> {
        if candidate.is_empty() {
            return Err(ValidationError::EmptyKey.into());
        }
        if candidate.chars().count() > self.max_key_len {
            return Err(ValidationError::KeyTooLong {
                max: self.max_key_len,
            }
            .into());
        }
        Ok(())
    }
}
