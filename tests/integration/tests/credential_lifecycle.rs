//! Integration test: credential issuance, revocation and verification
//! against issuer documents on a ledger.

use std::sync::Arc;

use tessera_core::{CredentialState, Did, ErrorKind, TesseraConfig};
use tessera_credentials::{
    CredentialError, CredentialLifecycle, CredentialRequest, CredentialVerifier,
    VerifiableCredential,
};
use tessera_identity::{DocumentManager, DidResolver};
use tessera_integration_tests::{in_memory_registry, TEST_MNEMONIC};
use tessera_proof::ProofEngine;

struct Issuer {
    lifecycle: CredentialLifecycle,
    documents: Arc<DocumentManager>,
    did: Did,
    secret: Vec<u8>,
}

async fn issuer() -> Issuer {
    let config = TesseraConfig::default();
    let lifecycle =
        CredentialLifecycle::from_config(in_memory_registry(&["local"]), &config).unwrap();
    let documents = lifecycle.documents().clone();
    let key = documents.root_key(TEST_MNEMONIC).unwrap();
    let did = documents
        .create_default_document(&key)
        .await
        .unwrap()
        .did()
        .unwrap();
    Issuer {
        lifecycle,
        documents,
        did,
        secret: key.private_key_bytes().to_vec(),
    }
}

fn request(issuer: &Did, n: u32) -> CredentialRequest {
    CredentialRequest::new(
        issuer.clone(),
        serde_json::json!({"id": format!("did:tessera:local:holder-{n}"), "level": n}),
    )
    .with_type("KycCredential")
}

async fn issue_many(issuer: &Issuer, count: u32) -> Vec<VerifiableCredential> {
    let mut issued = Vec::new();
    for n in 0..count {
        issued.push(
            issuer
                .lifecycle
                .issue(request(&issuer.did, n), &issuer.secret, true)
                .await
                .unwrap(),
        );
    }
    issued
}

#[tokio::test]
async fn test_revoke_then_unrevoke_index_seven() {
    let issuer = issuer().await;
    let mut issued = issue_many(&issuer, 8).await;
    let mut c1 = issued.pop().unwrap();
    assert_eq!(c1.revocation_index, Some(7));

    issuer.lifecycle.revoke(&mut c1, &issuer.secret).await.unwrap();
    let doc = issuer.documents.resolve_document(&issuer.did).await.unwrap();
    assert!(doc.revocation.is_set(7));
    assert_eq!(doc.revocation.revoked_count(), 1);
    assert!(issuer.documents.verify_document(&doc).unwrap());

    issuer.lifecycle.unrevoke(&mut c1, &issuer.secret).await.unwrap();
    let doc = issuer.documents.resolve_document(&issuer.did).await.unwrap();
    assert!(!doc.revocation.is_set(7));
    assert_eq!(c1.state, CredentialState::Issued);
}

#[tokio::test]
async fn test_double_revoke_matches_single_revoke() {
    let issuer = issuer().await;
    let mut issued = issue_many(&issuer, 3).await;

    issuer.lifecycle.revoke(&mut issued[1], &issuer.secret).await.unwrap();
    let once = issuer.documents.resolve_document(&issuer.did).await.unwrap();

    issuer.lifecycle.revoke(&mut issued[1], &issuer.secret).await.unwrap();
    let twice = issuer.documents.resolve_document(&issuer.did).await.unwrap();

    assert_eq!(once.revocation, twice.revocation);
    assert!(!twice.revocation.is_set(0));
    assert!(twice.revocation.is_set(1));
    assert!(!twice.revocation.is_set(2));
}

#[tokio::test]
async fn test_unrevoke_never_revoked_is_validation() {
    let issuer = issuer().await;
    let mut vc = issue_many(&issuer, 1).await.remove(0);
    let err = issuer
        .lifecycle
        .unrevoke(&mut vc, &issuer.secret)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::NotRevoked(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_rejected_slot_is_never_reused() {
    let issuer = issuer().await;
    let mut pending = issuer
        .lifecycle
        .issue(request(&issuer.did, 0), &issuer.secret, false)
        .await
        .unwrap();
    assert_eq!(pending.state, CredentialState::PendingVerification);
    issuer.lifecycle.reject(&mut pending).unwrap();

    let next = issuer
        .lifecycle
        .issue(request(&issuer.did, 1), &issuer.secret, true)
        .await
        .unwrap();
    assert_eq!(pending.revocation_index, Some(0));
    assert_eq!(next.revocation_index, Some(1));
}

#[tokio::test]
async fn test_verifier_tracks_revocation() {
    let issuer = issuer().await;
    let resolver: Arc<dyn DidResolver> = issuer.documents.clone();
    let verifier = CredentialVerifier::new(resolver).with_proof_engine(ProofEngine::ed25519());
    let mut vc = issue_many(&issuer, 1).await.remove(0);

    assert!(verifier.verify_credential(&vc).await.unwrap().valid);

    issuer.lifecycle.revoke(&mut vc, &issuer.secret).await.unwrap();
    let result = verifier.verify_credential(&vc).await.unwrap();
    assert!(!result.valid);
    assert!(!result.check("not_revoked").unwrap().passed);

    issuer.lifecycle.unrevoke(&mut vc, &issuer.secret).await.unwrap();
    assert!(verifier.verify_credential(&vc).await.unwrap().valid);
}

#[tokio::test]
async fn test_credential_survives_json_transport() {
    let issuer = issuer().await;
    let vc = issue_many(&issuer, 1).await.remove(0);

    let wire = serde_json::to_string(&vc).unwrap();
    let received: VerifiableCredential = serde_json::from_str(&wire).unwrap();

    let verifier = CredentialVerifier::new(issuer.documents.clone());
    assert!(verifier.verify_credential(&received).await.unwrap().valid);
    assert!(!issuer.lifecycle.is_revoked(&received).await.unwrap());
}
