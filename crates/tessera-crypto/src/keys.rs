use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Width of every private key handed out by this crate.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Minimum seed length accepted by [`KeyPair::from_seed`].
pub const SEED_LENGTH: usize = 32;

/// Signature key types supported for derivation and proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Ed25519,
}

impl KeyType {
    /// Canonical name, as written in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
        }
    }

    /// The DID document verification method type for this key type.
    pub fn verification_method_type(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519VerificationKey2020",
        }
    }

    /// The proof suite name used for signatures made with this key type.
    pub fn proof_type(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519Signature2020",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ed25519" | "ed25519" | "Ed25519VerificationKey2018" | "Ed25519VerificationKey2020" => {
                Ok(Self::Ed25519)
            }
            other => Err(CryptoError::UnsupportedKeyType(other.to_string())),
        }
    }
}

/// Signing key pair with a fixed-width 32-byte private key.
///
/// Whatever secret layout the underlying primitive uses natively, the private
/// key exposed here is always the 32-byte scalar seed, so it can be fed back
/// into SLIP-10 derivation unchanged. Private key material is zeroized on drop.
#[derive(Clone)]
pub struct KeyPair {
    key_type: KeyType,
    signing_key: SigningKey,
}

impl KeyPair {
    /// Build a signature key pair from seed material.
    ///
    /// The first 32 bytes of `seed` become the secret; the primitive's expanded
    /// secret is then normalized back to 32 bytes.
    pub fn from_seed(key_type: KeyType, seed: &[u8]) -> Result<Self, CryptoError> {
        if seed.len() < SEED_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: SEED_LENGTH,
                actual: seed.len(),
            });
        }
        let mut secret = Zeroizing::new([0u8; SEED_LENGTH]);
        secret.copy_from_slice(&seed[..SEED_LENGTH]);

        match key_type {
            KeyType::Ed25519 => {
                // secret ‖ public, the 64-byte layout most ed25519 libraries hand out.
                let expanded = Zeroizing::new(SigningKey::from_bytes(&secret).to_keypair_bytes());
                Self::from_private_key(key_type, &expanded[..])
            }
        }
    }

    /// Rebuild a key pair from a private key.
    ///
    /// Accepts the 32-byte scalar seed or the 64-byte expanded form
    /// (`secret ‖ public`), which is truncated after its public half is checked.
    pub fn from_private_key(key_type: KeyType, bytes: &[u8]) -> Result<Self, CryptoError> {
        match key_type {
            KeyType::Ed25519 => match bytes.len() {
                PRIVATE_KEY_LENGTH => {
                    let mut secret = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
                    secret.copy_from_slice(bytes);
                    Ok(Self {
                        key_type,
                        signing_key: SigningKey::from_bytes(&secret),
                    })
                }
                64 => {
                    let kp = Self::from_private_key(key_type, &bytes[..PRIVATE_KEY_LENGTH])?;
                    if kp.public_key().as_bytes()[..] != bytes[PRIVATE_KEY_LENGTH..] {
                        return Err(CryptoError::InvalidInput(
                            "expanded private key does not match its public half".into(),
                        ));
                    }
                    Ok(kp)
                }
                actual => Err(CryptoError::InvalidKeyLength {
                    expected: PRIVATE_KEY_LENGTH,
                    actual,
                }),
            },
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Get the raw private key bytes (32 bytes).
    /// Prefer signing through the key pair itself.
    pub fn private_key_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_LENGTH]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.key_type == other.key_type
            && *self.private_key_bytes() == *other.private_key_bytes()
    }
}

impl Eq for KeyPair {}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("key_type", &self.key_type)
            .field("public_key", &self.public_key().to_bs58())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key for verification operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    /// Get the raw bytes (32 bytes).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Encode as base58.
    pub fn to_bs58(&self) -> String {
        bs58::encode(self.as_bytes()).into_string()
    }

    /// Decode from base58.
    pub fn from_bs58(bs58_str: &str) -> Result<Self, CryptoError> {
        let bytes = bs58::decode(bs58_str)
            .into_vec()
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base58: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}
