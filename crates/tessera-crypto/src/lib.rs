pub mod derivation;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod mnemonic;
pub mod path;
pub mod secret;
pub mod signing;

pub use derivation::{child_key_pair, child_key_pair_range, name_to_path, root_key_pair};
pub use error::CryptoError;
pub use hashing::{hash, sha256};
pub use keys::{KeyPair, KeyType, PublicKey, PRIVATE_KEY_LENGTH};
pub use mnemonic::{generate_mnemonic, seed_from_mnemonic};
pub use path::DerivationPath;
pub use secret::{root_key_pair_from_secret, InMemorySecretSource, SecretSource};
pub use signing::{sign, verify, Ed25519Primitive, Signature, SigningPrimitive, SIGNATURE_LENGTH};
