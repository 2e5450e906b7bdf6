use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{CredentialState, Did};
use tessera_proof::Proof;
use uuid::Uuid;

use crate::error::CredentialError;

/// Base type carried by every credential.
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// What an issuer is asked to attest.
#[derive(Debug, Clone)]
pub struct CredentialRequest {
    pub issuer: Did,
    pub subject: serde_json::Value,
    pub credential_type: Vec<String>,
    /// Extra JSON-LD contexts, appended after the configured defaults.
    pub contexts: Vec<String>,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl CredentialRequest {
    pub fn new(issuer: Did, subject: serde_json::Value) -> Self {
        Self {
            issuer,
            subject,
            credential_type: Vec::new(),
            contexts: Vec::new(),
            expiration_date: None,
        }
    }

    pub fn with_type(mut self, credential_type: impl Into<String>) -> Self {
        self.credential_type.push(credential_type.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.contexts.push(context.into());
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration);
        self
    }
}

/// A W3C-style Verifiable Credential with a revocation slot in its
/// issuer's DID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiableCredential {
    /// Unique credential identifier (`urn:uuid:<v7>`).
    pub id: String,
    /// JSON-LD contexts.
    pub contexts: Vec<String>,
    /// Type(s), always starting with "VerifiableCredential".
    pub credential_type: Vec<String>,
    pub issuer: Did,
    /// Claims about the subject as arbitrary JSON.
    pub subject: serde_json::Value,
    pub issuance_date: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    /// Slot in the issuer's revocation registry.
    pub revocation_index: Option<u32>,
    pub state: CredentialState,
    /// Issuer proof; absent until the credential is approved.
    pub proof: Option<Proof>,
}

impl VerifiableCredential {
    /// Unsigned credential in `PendingVerification`.
    pub fn new(request: CredentialRequest, default_contexts: &[String]) -> Self {
        let mut contexts = default_contexts.to_vec();
        for context in request.contexts {
            if !contexts.contains(&context) {
                contexts.push(context);
            }
        }

        let mut types = vec![VERIFIABLE_CREDENTIAL_TYPE.to_string()];
        for t in request.credential_type {
            if !types.contains(&t) {
                types.push(t);
            }
        }

        Self {
            id: format!("urn:uuid:{}", Uuid::now_v7()),
            contexts,
            credential_type: types,
            issuer: request.issuer,
            subject: request.subject,
            issuance_date: Utc::now(),
            expiration_date: request.expiration_date,
            revocation_index: None,
            state: CredentialState::PendingVerification,
            proof: None,
        }
    }

    /// Canonical bytes the issuer signs: everything except `proof` and
    /// `state`, which change over the credential's life.
    pub fn signing_payload(&self) -> Result<Vec<u8>, CredentialError> {
        let canonical = serde_json::json!({
            "@context": self.contexts,
            "id": self.id,
            "type": self.credential_type,
            "issuer": self.issuer,
            "credentialSubject": self.subject,
            "issuanceDate": self.issuance_date.to_rfc3339(),
            "expirationDate": self.expiration_date.map(|d| d.to_rfc3339()),
            "revocationIndex": self.revocation_index,
        });
        serde_json::to_vec(&canonical).map_err(|e| CredentialError::Serialization(e.to_string()))
    }

    /// Check if the credential has been signed.
    pub fn is_signed(&self) -> bool {
        self.proof.is_some()
    }

    /// Check if the credential has expired.
    pub fn is_expired(&self) -> bool {
        self.expiration_date
            .map(|exp| Utc::now() > exp)
            .unwrap_or(false)
    }
}
