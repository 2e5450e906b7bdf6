use tessera_core::ErrorKind;

/// Credential system errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential {0} is not revoked")]
    NotRevoked(String),

    #[error("credential {0} has no revocation index")]
    MissingRevocationIndex(String),

    #[error("core error: {0}")]
    Core(#[from] tessera_core::CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] tessera_crypto::CryptoError),

    #[error("proof error: {0}")]
    Proof(#[from] tessera_proof::ProofError),

    #[error("identity error: {0}")]
    Identity(#[from] tessera_identity::IdentityError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CredentialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CredentialError::Core(e) => e.kind(),
            CredentialError::Crypto(e) => e.kind(),
            CredentialError::Proof(e) => e.kind(),
            CredentialError::Identity(e) => e.kind(),
            CredentialError::Serialization(_) => ErrorKind::General,
            _ => ErrorKind::Validation,
        }
    }
}
