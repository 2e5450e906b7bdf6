use tessera_core::ErrorKind;

/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid derivation path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("secret not found: {0}")]
    SecretNotFound(String),

    #[error("secret source failure for '{identifier}': {reason}")]
    SecretSource { identifier: String, reason: String },
}

impl CryptoError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Map onto the shared error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedKeyType(_)
            | Self::InvalidKeyLength { .. }
            | Self::InvalidPath { .. }
            | Self::InvalidMnemonic(_)
            | Self::SignatureVerificationFailed
            | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::SecretNotFound(_) => ErrorKind::NotFound,
            Self::KeyDerivationError(_) | Self::SecretSource { .. } => ErrorKind::General,
        }
    }
}
