//! Fixtures shared by the cross-crate tests in `tests/`.

use std::sync::Arc;

use tessera_crypto::{root_key_pair, KeyPair, KeyType};
use tessera_identity::{ConnectorRegistry, DocumentManager, InMemoryLedger, LedgerConnector};

/// BIP-39 test phrase (all-zero entropy).
pub const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// A registry with an in-memory ledger behind each namespace.
pub fn in_memory_registry(namespaces: &[&'static str]) -> Arc<ConnectorRegistry> {
    let registry = Arc::new(ConnectorRegistry::new());
    for namespace in namespaces {
        let namespace = *namespace;
        registry.register(namespace, move || {
            Arc::new(InMemoryLedger::new(namespace)) as Arc<dyn LedgerConnector>
        });
    }
    registry
}

pub fn document_manager(namespaces: &[&'static str]) -> Arc<DocumentManager> {
    Arc::new(DocumentManager::new(in_memory_registry(namespaces)))
}

/// Root key of [`TEST_MNEMONIC`] with no passphrase.
pub fn test_root_key() -> KeyPair {
    match root_key_pair(KeyType::Ed25519, TEST_MNEMONIC, "") {
        Ok(key) => key,
        Err(e) => panic!("test mnemonic must derive: {e}"),
    }
}
