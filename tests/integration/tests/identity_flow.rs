//! Integration test: DID documents routed through namespace connectors.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::{Did, ErrorKind};
use tessera_crypto::{child_key_pair, DerivationPath, KeyPair, KeyType};
use tessera_identity::{
    ConnectorError, ConnectorRegistry, DidDocument, DocumentManager, IdentityError,
    InMemoryLedger, LedgerConnector, Service, VerificationMethod,
};
use tessera_integration_tests::{document_manager, in_memory_registry, test_root_key};

fn controller(index: u32) -> KeyPair {
    let path = DerivationPath::from_str("m/0").unwrap().child(index).unwrap();
    child_key_pair(&test_root_key(), &path).unwrap()
}

/// Rejects the first update with a version conflict, then behaves.
struct ContendedLedger {
    inner: InMemoryLedger,
    conflict_pending: AtomicBool,
    updates: AtomicUsize,
}

impl ContendedLedger {
    fn new(namespace: &str) -> Self {
        Self {
            inner: InMemoryLedger::new(namespace),
            conflict_pending: AtomicBool::new(false),
            updates: AtomicUsize::new(0),
        }
    }

    fn arm(&self) {
        self.conflict_pending.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerConnector for ContendedLedger {
    fn namespace(&self) -> &str {
        self.inner.namespace()
    }

    async fn resolve_document(&self, did: &Did) -> Result<DidDocument, ConnectorError> {
        self.inner.resolve_document(did).await
    }

    async fn publish_document(&self, draft: DidDocument) -> Result<Did, ConnectorError> {
        self.inner.publish_document(draft).await
    }

    async fn update_document(&self, document: DidDocument) -> Result<(), ConnectorError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.conflict_pending.swap(false, Ordering::SeqCst) {
            return Err(ConnectorError::VersionConflict {
                expected: document.version,
                actual: document.version + 1,
            });
        }
        self.inner.update_document(document).await
    }
}

#[tokio::test]
async fn test_unregistered_namespace_is_not_found() {
    let documents = document_manager(&["local"]);
    let err = documents
        .create_document(&controller(1), "ns-a")
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::NamespaceNotRegistered(ref ns) if ns == "ns-a"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_namespace_routing() {
    let documents = document_manager(&["utxo", "object"]);
    let on_utxo = documents.create_document(&controller(1), "utxo").await.unwrap();
    let on_object = documents.create_document(&controller(2), "object").await.unwrap();

    let utxo_did = on_utxo.did().unwrap();
    let object_did = on_object.did().unwrap();
    assert_eq!(utxo_did.namespace(), "utxo");
    assert_eq!(object_did.namespace(), "object");

    assert_eq!(documents.resolve_document(&utxo_did).await.unwrap().id, on_utxo.id);

    // Same identifier under the other namespace is a different ledger.
    let misrouted =
        Did::from_parts(utxo_did.method(), "object", utxo_did.identifier()).unwrap();
    let err = documents.resolve_document(&misrouted).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_key_rotation() {
    let documents = document_manager(&["local"]);
    let old_key = controller(1);
    let new_key = controller(2);
    let did = documents
        .create_document(&old_key, "local")
        .await
        .unwrap()
        .did()
        .unwrap();

    let vm = VerificationMethod::new("#keys-2", KeyType::Ed25519, &new_key.public_key());
    documents
        .add_verification_method(&did, &old_key.private_key_bytes()[..], vm)
        .await
        .unwrap();
    let doc = documents
        .remove_verification_method(&did, &new_key.private_key_bytes()[..], "#keys-1")
        .await
        .unwrap();

    assert_eq!(doc.verification_methods.len(), 1);
    assert!(documents.verify_document(&doc).unwrap());

    // The retired key no longer controls the document.
    let err = documents
        .add_service(
            &did,
            &old_key.private_key_bytes()[..],
            Service::new("#web", "LinkedDomains", "https://example.com"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::UnauthorizedController(_)));
}

#[tokio::test]
async fn test_removals_never_empty_the_document() {
    let documents = document_manager(&["local"]);
    let k1 = controller(1);
    let did = documents
        .create_document(&k1, "local")
        .await
        .unwrap()
        .did()
        .unwrap();
    let key = k1.private_key_bytes();

    for i in 2..=4 {
        let vm = VerificationMethod::new(
            format!("#keys-{i}"),
            KeyType::Ed25519,
            &controller(i).public_key(),
        );
        documents
            .add_verification_method(&did, &key[..], vm)
            .await
            .unwrap();
    }
    for i in 2..=4 {
        documents
            .remove_verification_method(&did, &key[..], &format!("#keys-{i}"))
            .await
            .unwrap();
    }

    let before = documents.resolve_document(&did).await.unwrap();
    let err = documents
        .remove_verification_method(&did, &key[..], "#keys-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(documents.resolve_document(&did).await.unwrap(), before);
}

#[tokio::test]
async fn test_version_conflict_retry() {
    let ledger = Arc::new(ContendedLedger::new("local"));
    let registry = Arc::new(ConnectorRegistry::new());
    let shared = ledger.clone();
    registry.register("local", move || shared.clone() as Arc<dyn LedgerConnector>);
    let documents = DocumentManager::new(registry);

    let k1 = controller(1);
    let did = documents
        .create_document(&k1, "local")
        .await
        .unwrap()
        .did()
        .unwrap();
    ledger.arm();

    let mut attempts = 0;
    let doc = loop {
        attempts += 1;
        let service = Service::new("#hub", "IdentityHub", "https://hub.example.com");
        match documents
            .add_service(&did, &k1.private_key_bytes()[..], service)
            .await
        {
            Err(e) if e.is_version_conflict() => {
                assert_eq!(e.kind(), ErrorKind::General);
                continue;
            }
            other => break other.unwrap(),
        }
    };

    assert_eq!(attempts, 2);
    assert_eq!(doc.services.len(), 1);
    // create + conflicting write + retried write
    assert_eq!(ledger.updates.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_concurrent_first_use_shares_one_connector() {
    let built = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(ConnectorRegistry::new());
    let counter = built.clone();
    registry.register("local", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Arc::new(InMemoryLedger::new("local")) as Arc<dyn LedgerConnector>
    });
    let documents = Arc::new(DocumentManager::new(registry));

    let tasks: Vec<_> = (1..=8)
        .map(|i| {
            let documents = documents.clone();
            tokio::spawn(async move { documents.create_document(&controller(i), "local").await })
        })
        .collect();
    let created = futures::future::join_all(tasks).await;

    assert_eq!(built.load(Ordering::SeqCst), 1);
    for doc in created {
        let doc = doc.unwrap().unwrap();
        // One shared ledger: every document resolves through the same instance.
        assert!(documents.resolve_document(&doc.did().unwrap()).await.is_ok());
    }
}

#[tokio::test]
async fn test_override_connector_for_tests() {
    let registry = in_memory_registry(&["local"]);
    let documents = DocumentManager::new(registry.clone());
    let did = documents
        .create_document(&controller(1), "local")
        .await
        .unwrap()
        .did()
        .unwrap();

    // A fresh ledger replaces the old one; the earlier document is gone.
    registry.register("local", || {
        Arc::new(InMemoryLedger::new("local")) as Arc<dyn LedgerConnector>
    });
    let err = documents.resolve_document(&did).await.unwrap_err();
    assert!(matches!(err, IdentityError::DidNotFound(_)));
}
