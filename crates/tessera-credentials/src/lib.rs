//! Verifiable credentials bound to Tessera DIDs: issuance, the
//! approve/reject/revoke/unrevoke lifecycle, and verification.

pub mod credential;
pub mod error;
pub mod lifecycle;
pub mod verifier;

pub use credential::{CredentialRequest, VerifiableCredential};
pub use error::CredentialError;
pub use lifecycle::CredentialLifecycle;
pub use verifier::{CredentialVerifier, VerificationCheck, VerificationResult};
