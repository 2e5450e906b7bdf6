//! Integration test: hierarchical key derivation feeding document control.

use std::str::FromStr;

use tessera_core::{ErrorKind, TesseraConfig};
use tessera_crypto::{
    child_key_pair, child_key_pair_range, name_to_path, root_key_pair, root_key_pair_from_secret,
    DerivationPath, InMemorySecretSource, KeyType,
};
use tessera_integration_tests::{document_manager, test_root_key, TEST_MNEMONIC};

#[test]
fn test_child_at_m_44_0_is_reproducible() {
    let root = root_key_pair(KeyType::Ed25519, TEST_MNEMONIC, "").unwrap();
    let path = DerivationPath::from_str("m/44/0").unwrap();

    let first = child_key_pair(&root, &path).unwrap();
    let second = child_key_pair(&root, &path).unwrap();

    assert_eq!(first.public_key().as_bytes(), second.public_key().as_bytes());
    assert_eq!(*first.private_key_bytes(), *second.private_key_bytes());
    assert_ne!(first, root);
}

#[test]
fn test_root_key_is_deterministic() {
    let a = root_key_pair(KeyType::Ed25519, TEST_MNEMONIC, "").unwrap();
    let b = root_key_pair(KeyType::Ed25519, TEST_MNEMONIC, "").unwrap();
    assert_eq!(a, b);

    // The passphrase salts the seed.
    let salted = root_key_pair(KeyType::Ed25519, TEST_MNEMONIC, "TREZOR").unwrap();
    assert_ne!(a, salted);
}

#[test]
fn test_unsupported_key_type_is_validation() {
    let err = KeyType::from_str("secp256k1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_range_matches_individual_derivation() {
    let root = test_root_key();
    let base = DerivationPath::from_str("m/44'/501'").unwrap();
    let keys = child_key_pair_range(&root, &base, 10, 5).unwrap();
    assert_eq!(keys.len(), 5);

    for (i, key) in keys.iter().enumerate() {
        let path = base.child(10 + i as u32).unwrap();
        assert_eq!(key, &child_key_pair(&root, &path).unwrap());
    }
}

#[test]
fn test_sibling_and_nested_paths_are_distinct() {
    let root = test_root_key();
    let paths = ["m/0", "m/1", "m/0/0", "m/0/1", "m/1/0"];
    let keys: Vec<_> = paths
        .iter()
        .map(|p| child_key_pair(&root, &DerivationPath::from_str(p).unwrap()).unwrap())
        .collect();

    for (i, a) in keys.iter().enumerate() {
        assert_ne!(a, &root);
        for b in &keys[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_named_sub_identity() {
    let root = test_root_key();
    let short = name_to_path("mail").unwrap();
    let long = name_to_path(&"a much longer application label ".repeat(20)).unwrap();
    assert_eq!(short.depth(), 32);
    assert_eq!(long.depth(), 32);
    assert_eq!(short, name_to_path("mail").unwrap());

    let mail = child_key_pair(&root, &short).unwrap();
    let again = child_key_pair(&root, &name_to_path("mail").unwrap()).unwrap();
    let chat = child_key_pair(&root, &name_to_path("chat").unwrap()).unwrap();
    assert_eq!(mail, again);
    assert_ne!(mail, chat);
}

#[test]
fn test_malformed_path_is_validation() {
    for bad in ["", "44/0", "m/", "m/x", "m//1", "m/2147483648"] {
        let err = DerivationPath::from_str(bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "path {bad:?}");
    }
}

#[tokio::test]
async fn test_secret_source_to_controlled_document() {
    let config = TesseraConfig::default();
    let key_type = KeyType::from_str(&config.identity.key_type).unwrap();

    let vault = InMemorySecretSource::new();
    vault.insert("alice-root", TEST_MNEMONIC);
    let root = root_key_pair_from_secret(
        &vault,
        "alice-root",
        key_type,
        &config.identity.mnemonic_passphrase,
    )
    .await
    .unwrap();
    assert_eq!(root, test_root_key());

    let controller = child_key_pair(&root, &DerivationPath::from_str("m/0").unwrap()).unwrap();
    let documents = document_manager(&["local"]);
    let doc = documents
        .create_document(&controller, &config.identity.default_namespace)
        .await
        .unwrap();

    assert!(doc.find_method_by_public_key(&controller.public_key()).is_some());
    assert!(documents.verify_document(&doc).unwrap());
}
