use std::sync::Arc;

use tessera_core::config::CREDENTIALS_V1_CONTEXT;
use tessera_core::{CredentialEvent, CredentialState, CredentialStateMachine, TesseraConfig};
use tessera_crypto::KeyPair;
use tessera_identity::{ConnectorRegistry, DocumentManager, IdentityError};

use crate::credential::{CredentialRequest, VerifiableCredential};
use crate::error::CredentialError;

/// Issues credentials and drives them through
/// approve / reject / revoke / unrevoke.
///
/// Revocation state lives in the issuer's DID document, so every revoke or
/// unrevoke is a signed write to the issuer's ledger.
#[derive(Debug, Clone)]
pub struct CredentialLifecycle {
    documents: Arc<DocumentManager>,
    default_contexts: Vec<String>,
}

impl CredentialLifecycle {
    pub fn new(documents: Arc<DocumentManager>) -> Self {
        Self {
            documents,
            default_contexts: vec![CREDENTIALS_V1_CONTEXT.to_string()],
        }
    }

    /// Lifecycle over a [`DocumentManager`] built from `config`, so issuer
    /// documents created through it get `credentials.revocation_capacity`
    /// slots and credentials carry `credentials.default_contexts`.
    pub fn from_config(
        registry: Arc<ConnectorRegistry>,
        config: &TesseraConfig,
    ) -> Result<Self, CredentialError> {
        let documents = DocumentManager::from_config(registry, config)?;
        Ok(Self {
            documents: Arc::new(documents),
            default_contexts: config.credentials.default_contexts.clone(),
        })
    }

    pub fn documents(&self) -> &Arc<DocumentManager> {
        &self.documents
    }

    /// Create a credential and reserve its revocation slot.
    ///
    /// With `sign_now` the credential is signed and `Issued`; otherwise it
    /// stays `PendingVerification` until [`CredentialLifecycle::approve`].
    pub async fn issue(
        &self,
        request: CredentialRequest,
        issuer_private_key: &[u8],
        sign_now: bool,
    ) -> Result<VerifiableCredential, CredentialError> {
        let mut credential = VerifiableCredential::new(request, &self.default_contexts);
        let index = self
            .documents
            .allocate_revocation_index(&credential.issuer, issuer_private_key)
            .await?;
        credential.revocation_index = Some(index);

        if sign_now {
            self.approve(&mut credential, issuer_private_key).await?;
        }

        tracing::info!(
            credential_id = %credential.id,
            issuer = %credential.issuer,
            revocation_index = index,
            state = %credential.state,
            "credential issued"
        );
        Ok(credential)
    }

    /// Sign a pending credential.
    pub async fn approve(
        &self,
        credential: &mut VerifiableCredential,
        issuer_private_key: &[u8],
    ) -> Result<(), CredentialError> {
        let next = CredentialStateMachine::transition(credential.state, CredentialEvent::Approve)?;

        let issuer_key = self.issuer_key(issuer_private_key)?;
        let issuer_document = self.documents.resolve_document(&credential.issuer).await?;
        let method_id = issuer_document
            .find_method_by_public_key(&issuer_key.public_key())
            .map(|vm| vm.id.clone())
            .ok_or_else(|| IdentityError::UnauthorizedController(credential.issuer.to_string()))?;

        let payload = credential.signing_payload()?;
        let proof = self.documents.proof_engine().create_proof(
            &issuer_key.private_key_bytes()[..],
            &method_id,
            &payload,
        )?;
        credential.proof = Some(proof);
        credential.state = next;
        Ok(())
    }

    /// Decline a pending credential. Its revocation slot stays allocated
    /// and is never handed out again.
    pub fn reject(&self, credential: &mut VerifiableCredential) -> Result<(), CredentialError> {
        credential.state =
            CredentialStateMachine::transition(credential.state, CredentialEvent::Reject)?;
        tracing::info!(credential_id = %credential.id, "credential rejected");
        Ok(())
    }

    /// Set the credential's revocation bit. Revoking a revoked credential
    /// changes nothing and writes nothing.
    pub async fn revoke(
        &self,
        credential: &mut VerifiableCredential,
        issuer_private_key: &[u8],
    ) -> Result<(), CredentialError> {
        if credential.state == CredentialState::Revoked {
            tracing::debug!(credential_id = %credential.id, "credential already revoked");
            return Ok(());
        }
        let next = CredentialStateMachine::transition(credential.state, CredentialEvent::Revoke)?;
        let index = revocation_index(credential)?;

        self.documents
            .revoke_index(&credential.issuer, issuer_private_key, index)
            .await?;
        credential.state = next;
        tracing::info!(
            credential_id = %credential.id,
            issuer = %credential.issuer,
            revocation_index = index,
            "credential revoked"
        );
        Ok(())
    }

    /// Clear the credential's revocation bit and return it to `Issued`.
    pub async fn unrevoke(
        &self,
        credential: &mut VerifiableCredential,
        issuer_private_key: &[u8],
    ) -> Result<(), CredentialError> {
        if credential.state != CredentialState::Revoked {
            return Err(CredentialError::NotRevoked(credential.id.clone()));
        }
        let next = CredentialStateMachine::transition(credential.state, CredentialEvent::Unrevoke)?;
        let index = revocation_index(credential)?;

        self.documents
            .unrevoke_index(&credential.issuer, issuer_private_key, index)
            .await
            .map_err(|e| match e {
                IdentityError::NotRevoked { .. } => {
                    CredentialError::NotRevoked(credential.id.clone())
                }
                other => other.into(),
            })?;
        credential.state = next;
        tracing::info!(
            credential_id = %credential.id,
            issuer = %credential.issuer,
            revocation_index = index,
            "credential unrevoked"
        );
        Ok(())
    }

    /// Whether the issuer's registry currently marks the credential revoked.
    /// Credentials without a slot are never revoked.
    pub async fn is_revoked(&self, credential: &VerifiableCredential) -> Result<bool, CredentialError> {
        match credential.revocation_index {
            Some(index) => Ok(self.documents.is_revoked(&credential.issuer, index).await?),
            None => Ok(false),
        }
    }

    fn issuer_key(&self, issuer_private_key: &[u8]) -> Result<KeyPair, CredentialError> {
        let key_type = self.documents.proof_engine().key_type();
        Ok(KeyPair::from_private_key(key_type, issuer_private_key)?)
    }
}

fn revocation_index(credential: &VerifiableCredential) -> Result<u32, CredentialError> {
    credential
        .revocation_index
        .ok_or_else(|| CredentialError::MissingRevocationIndex(credential.id.clone()))
}
