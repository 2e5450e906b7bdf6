use std::fmt;

use crate::credential_state::CredentialState;

/// Coarse error classification shared by every Tessera crate.
///
/// - `Validation`: malformed input or a broken invariant. Local, never retried.
/// - `NotFound`: an unresolvable DID, unregistered namespace, or missing secret.
/// - `General`: a ledger/connector failure; the original cause is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    General,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not found"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} on {event}")]
    InvalidStateTransition {
        from: CredentialState,
        event: String,
    },

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}

impl CoreError {
    /// Map onto the shared error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStateTransition { .. }
            | Self::InvalidDid(_)
            | Self::Config(_) => ErrorKind::Validation,
            Self::ConfigIo(_) => ErrorKind::General,
        }
    }
}
