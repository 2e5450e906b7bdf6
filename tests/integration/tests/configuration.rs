//! Integration test: every field of a TOML config changes what the
//! identity and credential layers produce.

use std::sync::Arc;

use tessera_core::{ErrorKind, TesseraConfig};
use tessera_credentials::{CredentialLifecycle, CredentialRequest};
use tessera_crypto::{root_key_pair, DerivationPath, KeyType};
use tessera_identity::{ConnectorRegistry, DocumentManager, IdentityError};
use tessera_integration_tests::{test_root_key, TEST_MNEMONIC};

const CONFIG: &str = r#"
[identity]
did_method = "acme"
default_namespace = "staging"
key_type = "ed25519"
mnemonic_passphrase = "TREZOR"

[credentials]
revocation_capacity = 3
default_contexts = ["https://www.w3.org/2018/credentials/v1", "https://acme.example/ctx/v1"]
"#;

fn load(contents: &str) -> TesseraConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tessera.toml");
    std::fs::write(&path, contents).unwrap();
    TesseraConfig::load(&path).unwrap()
}

#[tokio::test]
async fn test_config_drives_document_creation() {
    let config = load(CONFIG);
    let registry = Arc::new(ConnectorRegistry::in_memory(&config.identity));
    let documents = DocumentManager::from_config(registry, &config).unwrap();
    assert_eq!(documents.default_namespace(), "staging");

    // The passphrase takes part in seed derivation.
    let root = documents.root_key(TEST_MNEMONIC).unwrap();
    assert_ne!(root, test_root_key());
    assert_eq!(
        root,
        root_key_pair(KeyType::Ed25519, TEST_MNEMONIC, "TREZOR").unwrap()
    );

    let path: DerivationPath = "m/0".parse().unwrap();
    let controller = documents.controller_key(TEST_MNEMONIC, &path).unwrap();
    let doc = documents.create_default_document(&controller).await.unwrap();
    let did = doc.did().unwrap();
    assert_eq!(did.method(), "acme");
    assert_eq!(did.namespace(), "staging");
    assert_eq!(doc.revocation.capacity(), 3);
    assert!(documents.verify_document(&doc).unwrap());

    // Only the configured namespace is served.
    let err = documents.create_document(&root, "local").await.unwrap_err();
    assert!(matches!(err, IdentityError::NamespaceNotRegistered(_)));
}

#[tokio::test]
async fn test_config_drives_credential_issuance() {
    let config = load(CONFIG);
    let registry = Arc::new(ConnectorRegistry::in_memory(&config.identity));
    let lifecycle = CredentialLifecycle::from_config(registry, &config).unwrap();
    let documents = lifecycle.documents();

    let key = documents.root_key(TEST_MNEMONIC).unwrap();
    let issuer = documents.create_default_document(&key).await.unwrap().did().unwrap();
    let secret = key.private_key_bytes();

    let request = || CredentialRequest::new(issuer.clone(), serde_json::json!({"member": true}));
    let mut indexes = Vec::new();
    for _ in 0..3 {
        let vc = lifecycle.issue(request(), &secret[..], true).await.unwrap();
        assert_eq!(vc.contexts, config.credentials.default_contexts);
        indexes.push(vc.revocation_index.unwrap());
    }
    assert_eq!(indexes, vec![0, 1, 2]);

    let err = lifecycle.issue(request(), &secret[..], true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_unsupported_key_type_rejected_at_construction() {
    let config = load(&CONFIG.replace("\"ed25519\"", "\"secp256k1\""));
    let registry = Arc::new(ConnectorRegistry::in_memory(&config.identity));
    let err = DocumentManager::from_config(registry, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TesseraConfig::load(&dir.path().join("absent.toml")).unwrap();
    let registry = Arc::new(ConnectorRegistry::in_memory(&config.identity));
    let documents = DocumentManager::from_config(registry, &config).unwrap();
    assert_eq!(documents.default_namespace(), "local");
    assert_eq!(documents.root_key(TEST_MNEMONIC).unwrap(), test_root_key());
}
