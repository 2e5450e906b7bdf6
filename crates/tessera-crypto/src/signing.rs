//! Ed25519 signatures over canonical payload bytes.
//!
//! [`sign`] and [`verify`] work on whole key pairs. Higher layers go through
//! [`SigningPrimitive`], which only sees raw key bytes, so a proof engine can
//! swap algorithms without touching document or credential code.

use ed25519_dalek::Signer;

use crate::error::CryptoError;
use crate::keys::{KeyPair, KeyType, PublicKey, PRIVATE_KEY_LENGTH};

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// A detached Ed25519 signature as carried inside document and credential
/// proofs (hex-encoded on the wire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inner: ed25519_dalek::Signature,
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.inner.to_bytes()
    }

    /// Parse a signature taken from a proof. Anything other than exactly
    /// [`SIGNATURE_LENGTH`] bytes is malformed input, not a failed check.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidInput(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self {
            inner: ed25519_dalek::Signature::from_bytes(&raw),
        })
    }

    /// Hex form stored in `Proof::signature_value`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Sign `payload` with a derived or root key pair.
pub fn sign(payload: &[u8], signer: &KeyPair) -> Signature {
    Signature {
        inner: signer.signing_key().sign(payload),
    }
}

/// Strict check of `signature` over `payload`.
///
/// A mismatch is [`CryptoError::SignatureVerificationFailed`]; callers that
/// want a boolean go through [`SigningPrimitive::verify`].
pub fn verify(
    payload: &[u8],
    signature: &Signature,
    signer: &PublicKey,
) -> Result<(), CryptoError> {
    signer
        .verifying_key()
        .verify_strict(payload, &signature.inner)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// Byte-signing primitive: sign with a 32-byte private key, verify with a
/// public key.
///
/// `verify` returns `Ok(false)` for a signature that does not match and
/// reserves `Err` for structurally malformed keys or signatures.
pub trait SigningPrimitive: Send + Sync {
    fn key_type(&self) -> KeyType;

    fn sign(
        &self,
        private_key: &[u8; PRIVATE_KEY_LENGTH],
        message: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError>;
}

/// Ed25519 implementation of [`SigningPrimitive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Primitive;

impl SigningPrimitive for Ed25519Primitive {
    fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    fn sign(
        &self,
        private_key: &[u8; PRIVATE_KEY_LENGTH],
        message: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let keypair = KeyPair::from_private_key(KeyType::Ed25519, private_key)?;
        Ok(sign(message, &keypair).to_bytes().to_vec())
    }

    fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        let pubkey = PublicKey::from_bytes(public_key)?;
        let signature = Signature::from_bytes(signature)?;
        Ok(verify(message, &signature, &pubkey).is_ok())
    }
}
