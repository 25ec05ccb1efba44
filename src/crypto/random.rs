//! OS entropy access.
//!
//! Every random byte in neng-pass (salts, nonces, generated passwords)
//! comes from here, so an unavailable entropy source always surfaces as
//! `CryptoFailure` instead of a panic or a silent fallback.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{NengPassError, Result};

/// Fill `buf` with bytes from the operating system's CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| NengPassError::CryptoFailure(format!("entropy source unavailable: {e}")))
}
