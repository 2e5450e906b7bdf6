use async_trait::async_trait;
use dashmap::DashMap;
use zeroize::Zeroizing;

use crate::derivation::root_key_pair;
use crate::error::CryptoError;
use crate::keys::{KeyPair, KeyType};

/// Source of root secrets (mnemonic phrases), typically backed by a vault.
///
/// Returned material is held only for the duration of a derivation and is
/// never persisted.
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn get_secret(&self, identifier: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

/// Process-local secret source, for tests and single-node deployments.
#[derive(Default)]
pub struct InMemorySecretSource {
    secrets: DashMap<String, Zeroizing<Vec<u8>>>,
}

impl InMemorySecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) a secret.
    pub fn insert(&self, identifier: impl Into<String>, secret: impl Into<Vec<u8>>) {
        self.secrets
            .insert(identifier.into(), Zeroizing::new(secret.into()));
    }

    /// Drop a secret.
    pub fn remove(&self, identifier: &str) -> bool {
        self.secrets.remove(identifier).is_some()
    }
}

#[async_trait]
impl SecretSource for InMemorySecretSource {
    async fn get_secret(&self, identifier: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        self.secrets
            .get(identifier)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CryptoError::SecretNotFound(identifier.to_string()))
    }
}

/// Fetch the mnemonic stored under `secret_id` and derive its root key pair.
pub async fn root_key_pair_from_secret(
    source: &dyn SecretSource,
    secret_id: &str,
    key_type: KeyType,
    passphrase: &str,
) -> Result<KeyPair, CryptoError> {
    let secret = source.get_secret(secret_id).await?;
    let phrase = std::str::from_utf8(&secret).map_err(|_| {
        CryptoError::InvalidMnemonic(format!("secret '{}' is not UTF-8 text", secret_id))
    })?;
    root_key_pair(key_type, phrase, passphrase)
}
