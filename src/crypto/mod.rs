//! Cryptographic primitives for neng-pass.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id password stretching (`kdf`)
//! - HKDF-based verifier and entry key derivation (`keys`)
//! - OS entropy access (`random`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod random;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, NONCE_LEN};
pub use kdf::{generate_salt, Argon2Params, KEY_LEN, SALT_LEN};
pub use keys::{compute_verifier, derive_entry_key, derive_key, verifier_matches, EntryRootKey};
pub use random::fill_random;
