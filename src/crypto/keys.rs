//! Domain-separated key derivation using HKDF-SHA256.
//!
//! From one Argon2id output we derive, with distinct `info` strings:
//! - the **verifier** stored in the master-key record, and
//! - the **entry root key**, from which a per-entry key is expanded for
//!   every password name.
//!
//! The verifier and the root key are never derived from the same salt
//! either: the master-key record and the vault each carry their own.

use hkdf::Hkdf;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use super::kdf::{stretch, Argon2Params, KEY_LEN};
use crate::errors::{NengPassError, Result};

const VERIFIER_INFO: &[u8] = b"neng-pass:verifier";
const ENTRY_ROOT_INFO: &[u8] = b"neng-pass:entry-root";

/// Compute the verifier for `master_key` under `salt`.
///
/// The verifier lets a candidate key be checked without storing the key.
/// It is useless as an encryption key: the entry keys use a different
/// HKDF context and a different salt.
pub fn compute_verifier(
    master_key: &str,
    salt: &[u8],
    params: &Argon2Params,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let stretched = stretch(master_key.as_bytes(), salt, params)?;
    hkdf_derive(&stretched[..], VERIFIER_INFO)
}

/// Compare a freshly computed verifier against the stored one in
/// constant time.
pub fn verifier_matches(candidate: &[u8], stored: &[u8]) -> bool {
    candidate.ct_eq(stored).into()
}

/// Derive the vault's entry root key from `master_key` and the vault salt.
pub fn derive_key(master_key: &str, salt: &[u8], params: &Argon2Params) -> Result<EntryRootKey> {
    let stretched = stretch(master_key.as_bytes(), salt, params)?;
    let bytes = hkdf_derive(&stretched[..], ENTRY_ROOT_INFO)?;
    Ok(EntryRootKey::new(*bytes))
}

/// Derive the encryption key for a single entry.
///
/// `info` is `"neng-pass:entry:<name>"`, which binds a ciphertext to
/// the name it was saved under.
pub fn derive_entry_key(root: &[u8], name: &str) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let info = format!("neng-pass:entry:{name}");
    hkdf_derive(root, info.as_bytes())
}

/// HKDF-SHA256 expand with the given `info`.
///
/// The extract step runs with no salt; the input already came out of
/// Argon2id and is uniformly distributed.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| NengPassError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// The vault's entry root key.  Zeroed when dropped.
///
/// Lives only for the duration of a single vault call.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct EntryRootKey {
    bytes: [u8; KEY_LEN],
}

impl EntryRootKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the per-entry encryption key for `name`.
    pub fn entry_key(&self, name: &str) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        derive_entry_key(&self.bytes, name)
    }
}
