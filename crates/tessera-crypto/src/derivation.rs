//! Deterministic hierarchical key derivation.
//!
//! One mnemonic yields a root key pair; SLIP-10 (ed25519, hardened-only)
//! seeded by any key pair's private key yields an unbounded, reproducible
//! tree of child key pairs.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hashing::sha256;
use crate::keys::{KeyPair, KeyType};
use crate::mnemonic::seed_from_mnemonic;
use crate::path::{DerivationPath, HARDENED_OFFSET};

type HmacSha512 = Hmac<Sha512>;

/// SLIP-10 master key salt for the ed25519 curve.
const ED25519_CURVE_SEED: &[u8] = b"ed25519 seed";

/// A SLIP-10 node: 32-byte private key plus 32-byte chain code.
struct ExtendedKey {
    key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    fn master(seed: &[u8]) -> Result<Self, CryptoError> {
        Self::from_hmac(ED25519_CURVE_SEED, &[seed])
    }

    fn hardened_child(&self, index: u32) -> Result<Self, CryptoError> {
        let index = (index | HARDENED_OFFSET).to_be_bytes();
        Self::from_hmac(&self.chain_code[..], &[&[0u8][..], &self.key[..], &index[..]])
    }

    fn from_hmac(key: &[u8], parts: &[&[u8]]) -> Result<Self, CryptoError> {
        let mut mac = HmacSha512::new_from_slice(key)
            .map_err(|e| CryptoError::KeyDerivationError(format!("hmac init failed: {}", e)))?;
        for part in parts {
            mac.update(part);
        }
        let mut output = Zeroizing::new([0u8; 64]);
        output.copy_from_slice(&mac.finalize().into_bytes());

        let mut node = Self {
            key: Zeroizing::new([0u8; 32]),
            chain_code: Zeroizing::new([0u8; 32]),
        };
        node.key.copy_from_slice(&output[..32]);
        node.chain_code.copy_from_slice(&output[32..]);
        Ok(node)
    }
}

/// Run SLIP-10 ed25519 derivation from `seed` along `path`, returning the
/// 32-byte private key at the end of the path.
pub fn slip10_derive(
    seed: &[u8],
    path: &DerivationPath,
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let mut node = ExtendedKey::master(seed)?;
    for &index in path.segments() {
        node = node.hardened_child(index)?;
    }
    Ok(node.key)
}

/// Derive the root key pair for a mnemonic.
///
/// Same mnemonic, passphrase and key type always yield byte-identical output.
pub fn root_key_pair(
    key_type: KeyType,
    mnemonic: &str,
    passphrase: &str,
) -> Result<KeyPair, CryptoError> {
    let seed = seed_from_mnemonic(mnemonic, passphrase)?;
    let kp = KeyPair::from_seed(key_type, &seed[..])?;
    tracing::debug!(key_type = %key_type, "derived root key pair");
    Ok(kp)
}

/// Derive the child of `parent` at `path`.
///
/// SLIP-10 is seeded with the parent's 32-byte private key; the resulting
/// 32-byte subseed becomes the child's signature key pair.
pub fn child_key_pair(parent: &KeyPair, path: &DerivationPath) -> Result<KeyPair, CryptoError> {
    let subseed = slip10_derive(&parent.private_key_bytes()[..], path)?;
    let kp = KeyPair::from_seed(parent.key_type(), &subseed[..])?;
    tracing::debug!(path = %path, "derived child key pair");
    Ok(kp)
}

/// Derive `count` children at `path_root/start .. path_root/start+count-1`.
///
/// Equivalent to calling [`child_key_pair`] once per index.
pub fn child_key_pair_range(
    parent: &KeyPair,
    path_root: &DerivationPath,
    start: u32,
    count: u32,
) -> Result<Vec<KeyPair>, CryptoError> {
    let end = start
        .checked_add(count)
        .filter(|end| *end <= HARDENED_OFFSET)
        .ok_or_else(|| {
            CryptoError::invalid_path(
                format!("{}/{}", path_root, start),
                format!("range of {} children exceeds the hardened range", count),
            )
        })?;

    let mut path = path_root.clone();
    let mut children = Vec::with_capacity(count as usize);
    for index in start..end {
        path.push(index)?;
        children.push(child_key_pair(parent, &path)?);
        path.pop();
    }
    Ok(children)
}

/// Map a human-meaningful name to a fixed-depth derivation path.
///
/// Each byte of SHA-256(`name`) becomes one segment, so every name maps to a
/// 32-segment path regardless of its length. Every segment is a byte, so the
/// path is always within the hardened range.
pub fn name_to_path(name: &str) -> Result<DerivationPath, CryptoError> {
    let segments = sha256(name.as_bytes()).map(u32::from);
    DerivationPath::new(segments.to_vec())
}
