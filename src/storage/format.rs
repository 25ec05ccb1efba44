//! Versioned envelope format and atomic file replacement.
//!
//! Every file the file backend writes has this layout:
//!
//! ```text
//! [magic: 4 bytes][version: 1 byte][body JSON][SHA-256(body): 32 bytes]
//! ```
//!
//! - **Magic** identifies the file (`NPMK` master-key record, `NPVT` vault).
//! - **Version** is the body format version (currently `1`).  Readers
//!   dispatch on it, which is where a migration from an older body
//!   format plugs in.  Versions newer than this build are refused.
//! - **Checksum** detects truncated or bit-flipped files before the body
//!   is parsed.  It is not a MAC: entry confidentiality and integrity
//!   come from AES-GCM, and the verifier is a one-way value.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::errors::{NengPassError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes of the master-key record file.
pub const MASTER_MAGIC: &[u8; 4] = b"NPMK";

/// Magic bytes of the vault file.
pub const VAULT_MAGIC: &[u8; 4] = b"NPVT";

/// Current body format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the checksum appended to the file (SHA-256 = 32 bytes).
const CHECKSUM_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version).
const PREFIX_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A decoded envelope: the format version and the raw body bytes.
#[derive(Debug)]
pub struct Envelope {
    pub version: u8,
    pub body: Vec<u8>,
}

/// Wrap `body` in the envelope for `magic` at the current version.
pub fn encode_envelope(magic: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let checksum = Sha256::digest(body);

    let mut buf = Vec::with_capacity(PREFIX_LEN + body.len() + CHECKSUM_LEN);
    buf.extend_from_slice(magic); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(body); // body JSON
    buf.extend_from_slice(&checksum); // 32 bytes
    buf
}

/// Unwrap an envelope, checking magic, version and checksum.
pub fn decode_envelope(magic: &[u8; 4], data: &[u8]) -> Result<Envelope> {
    if data.len() < PREFIX_LEN + CHECKSUM_LEN {
        return Err(NengPassError::InvalidFormat(
            "file too small to be a valid record".into(),
        ));
    }

    if &data[0..4] != magic {
        return Err(NengPassError::InvalidFormat(format!(
            "missing {} magic bytes",
            String::from_utf8_lossy(magic)
        )));
    }

    let version = data[4];
    if version == 0 || version > CURRENT_VERSION {
        return Err(NengPassError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        });
    }

    let body_end = data.len() - CHECKSUM_LEN;
    let body = &data[PREFIX_LEN..body_end];
    let stored = &data[body_end..];

    if Sha256::digest(body).as_slice() != stored {
        return Err(NengPassError::InvalidFormat(
            "checksum mismatch — file is truncated or corrupted".into(),
        ));
    }

    Ok(Envelope {
        version,
        body: body.to_vec(),
    })
}

/// Read and unwrap the envelope at `path`, or `None` if the file does
/// not exist.
pub fn read_envelope(path: &Path, magic: &[u8; 4]) -> Result<Option<Envelope>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    decode_envelope(magic, &data).map(Some)
}

// ---------------------------------------------------------------------------
// Atomic replace
// ---------------------------------------------------------------------------

/// Write `bytes` to `path` **atomically**.
///
/// 1. Write to a temp file in the same directory (owner-only on Unix).
/// 2. `fsync` the temp file.
/// 3. Rename it over the target path.
/// 4. On Unix, `fsync` the directory so the rename itself is durable.
///
/// Readers see either the old file or the new one, never a torn write.
/// Callers must hold the store's write lock: the temp name is fixed.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let written = write_synced(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    #[cfg(unix)]
    fs::File::open(parent)?.sync_all()?;

    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
