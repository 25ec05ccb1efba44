//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! returns it next to the ciphertext; the two are stored side by side
//! in a vault entry.  The ciphertext carries the 16-byte auth tag, so
//! `decrypt` either returns the exact plaintext or fails.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use super::random::fill_random;
use crate::errors::{NengPassError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns `(ciphertext, nonce)`.  Fails with `CryptoFailure` only if
/// no nonce could be drawn from the OS entropy source.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN])> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| NengPassError::CryptoFailure(format!("invalid key length: {e}")))?;

    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| NengPassError::CryptoFailure(format!("encryption error: {e}")))?;

    Ok((ciphertext, nonce))
}

/// Decrypt data produced by `encrypt`.
///
/// A wrong key, a nonce of the wrong size, or any modification of the
/// ciphertext fails with `AuthenticationFailure`.
pub fn decrypt(key: &[u8], ciphertext: &[u8], nonce: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LEN {
        return Err(NengPassError::AuthenticationFailure);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| NengPassError::AuthenticationFailure)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| NengPassError::AuthenticationFailure)?;

    Ok(Zeroizing::new(plaintext))
}
