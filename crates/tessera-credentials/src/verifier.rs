use std::sync::Arc;

use tessera_identity::{DidResolver, IdentityError};
use tessera_proof::ProofEngine;

use crate::credential::VerifiableCredential;
use crate::error::CredentialError;

/// Result of credential verification.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Whether the credential is valid.
    pub valid: bool,
    /// Individual check results.
    pub checks: Vec<VerificationCheck>,
}

impl VerificationResult {
    /// The named check, if it ran.
    pub fn check(&self, name: &str) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// An individual verification check.
#[derive(Debug, Clone)]
pub struct VerificationCheck {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Optional detail message.
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn new(name: &str, passed: bool, failure: impl FnOnce() -> String) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: if passed { None } else { Some(failure()) },
        }
    }
}

/// Verifies credentials against a fresh read of the issuer's DID document.
pub struct CredentialVerifier {
    resolver: Arc<dyn DidResolver>,
    proof_engine: ProofEngine,
}

impl CredentialVerifier {
    pub fn new(resolver: Arc<dyn DidResolver>) -> Self {
        Self {
            resolver,
            proof_engine: ProofEngine::default(),
        }
    }

    pub fn with_proof_engine(mut self, proof_engine: ProofEngine) -> Self {
        self.proof_engine = proof_engine;
        self
    }

    /// Verify a credential.
    ///
    /// Returns `Err` only when the issuer's ledger cannot be reached; every
    /// problem with the credential itself is reported as a failed check.
    pub async fn verify_credential(
        &self,
        credential: &VerifiableCredential,
    ) -> Result<VerificationResult, CredentialError> {
        let mut checks = Vec::new();

        let Some(proof) = credential.proof.as_ref() else {
            checks.push(VerificationCheck::new("signature_present", false, || {
                "credential is not signed".into()
            }));
            return Ok(VerificationResult {
                valid: false,
                checks,
            });
        };
        checks.push(VerificationCheck::new("signature_present", true, String::new));

        let issuer_document = match self.resolver.resolve(&credential.issuer).await {
            Ok(doc) => doc,
            Err(IdentityError::DidNotFound(_)) | Err(IdentityError::NamespaceNotRegistered(_)) => {
                checks.push(VerificationCheck::new("issuer_resolved", false, || {
                    format!("issuer {} cannot be resolved", credential.issuer)
                }));
                return Ok(VerificationResult {
                    valid: false,
                    checks,
                });
            }
            Err(e) => return Err(e.into()),
        };
        checks.push(VerificationCheck::new("issuer_resolved", true, String::new));

        let method = issuer_document.verification_method(&proof.verification_method);
        checks.push(VerificationCheck::new(
            "verification_method_known",
            method.is_some(),
            || {
                format!(
                    "{} is not a verification method of the issuer",
                    proof.verification_method
                )
            },
        ));

        let signature = match method {
            Some(method) => self.check_signature(credential, method, proof),
            None => Err("issuer key unavailable".to_string()),
        };
        let signature_valid = signature.is_ok();
        checks.push(VerificationCheck::new("signature_valid", signature_valid, || {
            signature.err().unwrap_or_default()
        }));

        let revoked = credential
            .revocation_index
            .map(|index| issuer_document.revocation.is_set(index))
            .unwrap_or(false);
        checks.push(VerificationCheck::new("not_revoked", !revoked, || {
            "issuer has revoked this credential".into()
        }));

        let not_expired = !credential.is_expired();
        checks.push(VerificationCheck::new("not_expired", not_expired, || {
            "credential has expired".into()
        }));

        // Revocation is judged by the registry above, not by the holder's copy.
        let signed_state = credential.state.is_signed();
        checks.push(VerificationCheck::new("state_signed", signed_state, || {
            format!("credential is {}", credential.state)
        }));

        let valid = checks.iter().all(|c| c.passed);
        tracing::debug!(credential_id = %credential.id, valid, "credential verified");
        Ok(VerificationResult { valid, checks })
    }

    fn check_signature(
        &self,
        credential: &VerifiableCredential,
        method: &tessera_identity::VerificationMethod,
        proof: &tessera_proof::Proof,
    ) -> Result<(), String> {
        let public_key = method.public_key().map_err(|e| e.to_string())?;
        let payload = credential.signing_payload().map_err(|e| e.to_string())?;
        match self
            .proof_engine
            .verify_proof(public_key.as_bytes(), &payload, proof)
        {
            Ok(true) => Ok(()),
            Ok(false) => Err("signature does not match credential".into()),
            Err(e) => Err(format!("malformed proof: {}", e)),
        }
    }
}
