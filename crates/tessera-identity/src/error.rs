use tessera_core::ErrorKind;

use crate::connector::ConnectorError;

/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("DID not found: {0}")]
    DidNotFound(String),

    #[error("no connector registered for namespace '{0}'")]
    NamespaceNotRegistered(String),

    #[error("invalid DID document: {0}")]
    InvalidDocument(String),

    #[error("verification method '{0}' already present")]
    DuplicateMethod(String),

    #[error("verification method '{0}' not found")]
    MethodNotFound(String),

    #[error("cannot remove '{0}': a document must keep at least one verification method")]
    LastVerificationMethod(String),

    #[error("verification method '{0}' authorizes this change and cannot remove itself")]
    SignerRemoved(String),

    #[error("service '{0}' already present")]
    DuplicateService(String),

    #[error("service '{0}' not found")]
    ServiceNotFound(String),

    #[error("controller key is not a verification method of {0}")]
    UnauthorizedController(String),

    #[error("revocation registry is full ({capacity} slots)")]
    RevocationCapacityExhausted { capacity: u32 },

    #[error("revocation index {index} was never allocated (next index {next_index})")]
    RevocationIndexOutOfRange { index: u32, next_index: u32 },

    #[error("revocation index {index} of {did} is not revoked")]
    NotRevoked { did: String, index: u32 },

    #[error("ledger connector for namespace '{namespace}' failed: {source}")]
    Connector {
        namespace: String,
        #[source]
        source: ConnectorError,
    },

    #[error("core error: {0}")]
    Core(#[from] tessera_core::CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] tessera_crypto::CryptoError),

    #[error("proof error: {0}")]
    Proof(#[from] tessera_proof::ProofError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl IdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::DidNotFound(_) | IdentityError::NamespaceNotRegistered(_) => {
                ErrorKind::NotFound
            }
            IdentityError::Connector { .. } | IdentityError::Serialization(_) => ErrorKind::General,
            IdentityError::Core(e) => e.kind(),
            IdentityError::Crypto(e) => e.kind(),
            IdentityError::Proof(e) => e.kind(),
            _ => ErrorKind::Validation,
        }
    }

    /// True when the ledger rejected a write made against a stale document.
    /// Callers retry by re-resolving and reapplying their change.
    pub fn is_version_conflict(&self) -> bool {
        matches!(
            self,
            IdentityError::Connector {
                source: ConnectorError::VersionConflict { .. },
                ..
            }
        )
    }
}
