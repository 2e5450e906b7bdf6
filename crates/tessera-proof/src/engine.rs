use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_crypto::{
    CryptoError, Ed25519Primitive, KeyType, SigningPrimitive, PRIVATE_KEY_LENGTH,
};

use crate::error::ProofError;

/// A detached proof: a signature over bytes that travel separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Proof suite (e.g. "Ed25519Signature2020").
    pub proof_type: String,
    /// Verification method whose key produced the signature
    /// (e.g. "did:tessera:local:abc#keys-1").
    pub verification_method: String,
    /// Signature value (hex-encoded).
    pub signature_value: String,
    /// When the proof was created.
    pub created: DateTime<Utc>,
}

/// Creates and verifies detached proofs with a single signing primitive.
#[derive(Clone)]
pub struct ProofEngine {
    primitive: Arc<dyn SigningPrimitive>,
}

impl ProofEngine {
    pub fn new(primitive: Arc<dyn SigningPrimitive>) -> Self {
        Self { primitive }
    }

    /// Engine backed by Ed25519.
    pub fn ed25519() -> Self {
        Self::new(Arc::new(Ed25519Primitive))
    }

    /// Engine for a configured key type.
    pub fn for_key_type(key_type: KeyType) -> Self {
        match key_type {
            KeyType::Ed25519 => Self::ed25519(),
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.primitive.key_type()
    }

    /// Proof suite name this engine produces and accepts.
    pub fn proof_type(&self) -> &'static str {
        self.key_type().proof_type()
    }

    /// Sign `payload` exactly as given.
    pub fn create_proof(
        &self,
        private_key: &[u8],
        verification_method: &str,
        payload: &[u8],
    ) -> Result<Proof, ProofError> {
        let private_key: &[u8; PRIVATE_KEY_LENGTH] =
            private_key
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: PRIVATE_KEY_LENGTH,
                    actual: private_key.len(),
                })?;
        let signature = self.primitive.sign(private_key, payload)?;

        tracing::debug!(
            verification_method,
            payload_len = payload.len(),
            "created detached proof"
        );

        Ok(Proof {
            proof_type: self.proof_type().to_string(),
            verification_method: verification_method.to_string(),
            signature_value: hex::encode(signature),
            created: Utc::now(),
        })
    }

    /// Check `proof` against `public_key` and `payload`.
    ///
    /// A well-formed signature that does not match yields `Ok(false)`.
    /// Malformed keys, signatures or a foreign proof suite are errors.
    pub fn verify_proof(
        &self,
        public_key: &[u8],
        payload: &[u8],
        proof: &Proof,
    ) -> Result<bool, ProofError> {
        if proof.proof_type != self.proof_type() {
            return Err(ProofError::UnsupportedProofType {
                expected: self.proof_type().to_string(),
                actual: proof.proof_type.clone(),
            });
        }

        let signature = hex::decode(&proof.signature_value).map_err(|e| {
            ProofError::InvalidProofData(format!("invalid signature hex: {}", e))
        })?;

        let valid = self.primitive.verify(public_key, payload, &signature)?;
        tracing::debug!(
            verification_method = %proof.verification_method,
            valid,
            "verified detached proof"
        );
        Ok(valid)
    }
}

impl Default for ProofEngine {
    fn default() -> Self {
        Self::ed25519()
    }
}

impl fmt::Debug for ProofEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofEngine")
            .field("key_type", &self.primitive.key_type())
            .finish()
    }
}
