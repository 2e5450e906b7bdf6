use tessera_core::ErrorKind;

/// Proof creation and verification errors.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("invalid proof data: {0}")]
    InvalidProofData(String),

    #[error("unsupported proof type '{actual}', engine produces '{expected}'")]
    UnsupportedProofType { expected: String, actual: String },

    #[error("crypto error: {0}")]
    Crypto(#[from] tessera_crypto::CryptoError),
}

impl ProofError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProofError::Crypto(e) => e.kind(),
            _ => ErrorKind::Validation,
        }
    }
}
