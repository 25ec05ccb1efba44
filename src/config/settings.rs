use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{NengPassError, Result};

/// Which storage layout holds the master-key record and the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Two versioned envelope files, committed by temp-file + rename.
    File,
    /// A single SQLite database, committed by transactions.
    Sqlite,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Installation-level configuration, loaded from `neng-pass.toml` in
/// the data directory.
///
/// Every field has a sensible default so neng-pass works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Longest accepted master key, in characters.
    #[serde(default = "default_max_master_key_len")]
    pub max_master_key_len: usize,

    /// Longest accepted stored password, in characters.
    #[serde(default = "default_max_password_len")]
    pub max_password_len: usize,

    /// Longest accepted password name, in characters.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    /// Length of passwords produced by the generator.
    #[serde(default = "default_generated_length")]
    pub generated_length: usize,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Storage layout (default: file).
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_max_master_key_len() -> usize {
    32
}

fn default_max_password_len() -> usize {
    16
}

fn default_max_name_len() -> usize {
    64
}

fn default_generated_length() -> usize {
    16
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_backend() -> BackendKind {
    BackendKind::File
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_master_key_len: default_max_master_key_len(),
            max_password_len: default_max_password_len(),
            max_name_len: default_max_name_len(),
            generated_length: default_generated_length(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            backend: default_backend(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the data directory.
    pub const FILE_NAME: &'static str = "neng-pass.toml";

    /// Load settings from `<data_dir>/neng-pass.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or fails validation, an
    /// error is returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            NengPassError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        tracing::debug!(path = %config_path.display(), "loaded settings");

        Ok(settings)
    }

    /// Check that the limits are usable together.
    pub fn validate(&self) -> Result<()> {
        if self.max_master_key_len == 0 || self.max_password_len == 0 || self.max_name_len == 0 {
            return Err(NengPassError::ConfigError(
                "length limits must be at least 1".into(),
            ));
        }
        if self.generated_length == 0 || self.generated_length > self.max_password_len {
            return Err(NengPassError::ConfigError(format!(
                "generated_length must be between 1 and max_password_len ({}), got {}",
                self.max_password_len, self.generated_length
            )));
        }
        self.argon2_params()
            .check()
            .map_err(|e| NengPassError::ConfigError(e.to_string()))
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Resolve the data directory: an explicit path wins, then the
    /// platform data directory, then `./.neng-pass`.
    pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
        if let Some(dir) = explicit {
            return dir.to_path_buf();
        }
        match dirs::data_dir() {
            Some(dir) => dir.join("neng-pass"),
            None => PathBuf::from("./.neng-pass"),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
