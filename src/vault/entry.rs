//! Types stored inside the vault.
//!
//! An entry holds its name, the AES-GCM ciphertext and nonce, and
//! creation/update timestamps.  Byte fields use the base64 serde
//! helpers so they serialize as strings in the JSON body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::storage::format::{base64_decode, base64_encode};

/// A single encrypted password stored in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    /// The unique name of the password (e.g. "github").
    pub name: String,

    /// AES-256-GCM ciphertext including the auth tag.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// The nonce used for this encryption, never reused.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub nonce: Vec<u8>,

    /// When an entry with this name was first saved.
    pub created_at: DateTime<Utc>,

    /// When this entry was last overwritten.
    pub updated_at: DateTime<Utc>,
}

impl VaultEntry {
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Lightweight metadata about an entry (no ciphertext).
///
/// Names are not confidential, so listing needs no master key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The vault's own key-derivation record.
///
/// Entry keys are derived from the master key under this salt, which is
/// independent of the master-key record's salt.  Created on the first
/// save and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultKdf {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    pub argon2_params: Argon2Params,

    pub created_at: DateTime<Utc>,
}
