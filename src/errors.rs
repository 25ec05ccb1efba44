use thiserror::Error;

/// Rejected caller input. Returned synchronously, never a system fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("the master key cannot be empty")]
    EmptyKey,

    #[error("the master key is too long (at most {max} characters)")]
    KeyTooLong { max: usize },

    #[error("a master key has already been set for this installation")]
    AlreadySet,

    #[error("the password name cannot be empty")]
    EmptyName,

    #[error("the password name is too long (at most {max} characters)")]
    NameTooLong { max: usize },

    #[error("the password cannot be empty")]
    EmptyPassword,

    #[error("the password is too long (at most {max} characters)")]
    ValueTooLong { max: usize },
}

/// All errors that can occur in neng-pass.
#[derive(Debug, Error)]
pub enum NengPassError {
    // --- Caller input ---
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // --- Crypto errors ---
    #[error("Authentication failed — wrong master key or corrupted entry")]
    AuthenticationFailure,

    #[error("Cryptographic failure: {0}")]
    CryptoFailure(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Lookup errors ---
    #[error("Password '{0}' not found")]
    NotFound(String),

    // --- Storage errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid storage format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported storage format version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u8, supported: u8 },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Key mismatch — the keys you entered do not match")]
    PasswordMismatch,

    #[error("That is the wrong master key")]
    WrongMasterKey,

    #[error("No master key has been set yet — run `neng-pass set-master` first")]
    MasterKeyNotSet,
}

impl NengPassError {
    /// True for bad caller input (empty or over-long fields, repeated setup).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for failures of the backing store. The operation that hit one
    /// did not complete; the caller may retry the whole operation.
    pub fn is_storage_failure(&self) -> bool {
        match self {
            Self::Io(_)
            | Self::InvalidFormat(_)
            | Self::UnsupportedVersion { .. }
            | Self::SerializationError(_) => true,
            #[cfg(feature = "sqlite")]
            Self::Database(_) => true,
            _ => false,
        }
    }
}

/// Convenience type alias for neng-pass results.
pub type Result<T> = std::result::Result<T, NengPassError>;
