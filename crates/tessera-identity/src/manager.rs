use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tessera_core::{Did, TesseraConfig};
use tessera_crypto::{child_key_pair, root_key_pair, DerivationPath, KeyPair, KeyType};
use tessera_proof::ProofEngine;
use zeroize::Zeroizing;

use crate::connector::{ConnectorError, LedgerConnector};
use crate::document::{DidDocument, Service, VerificationMethod};
use crate::error::IdentityError;
use crate::registry::ConnectorRegistry;
use crate::revocation::DEFAULT_REVOCATION_CAPACITY;

/// Namespace used by [`DocumentManager::create_default_document`] unless
/// configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "local";

/// Creates, resolves and mutates DID documents through the ledger
/// connector registered for each DID's namespace.
///
/// Every mutation is a read-modify-publish cycle authorized by possession
/// of a key already present in the document. Concurrent writers are not
/// serialized here; a stale write surfaces as a version conflict.
#[derive(Clone)]
pub struct DocumentManager {
    registry: Arc<ConnectorRegistry>,
    proof_engine: ProofEngine,
    revocation_capacity: u32,
    default_namespace: String,
    mnemonic_passphrase: Zeroizing<String>,
}

impl DocumentManager {
    pub fn new(registry: Arc<ConnectorRegistry>) -> Self {
        Self {
            registry,
            proof_engine: ProofEngine::default(),
            revocation_capacity: DEFAULT_REVOCATION_CAPACITY,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            mnemonic_passphrase: Zeroizing::new(String::new()),
        }
    }

    /// Manager shaped by `config`: key type and passphrase for controller
    /// keys, the default namespace, and the revocation capacity of new
    /// documents.
    pub fn from_config(
        registry: Arc<ConnectorRegistry>,
        config: &TesseraConfig,
    ) -> Result<Self, IdentityError> {
        config.validate()?;
        let key_type = KeyType::from_str(&config.identity.key_type)?;
        Ok(Self {
            registry,
            proof_engine: ProofEngine::for_key_type(key_type),
            revocation_capacity: config.credentials.revocation_capacity,
            default_namespace: config.identity.default_namespace.clone(),
            mnemonic_passphrase: Zeroizing::new(config.identity.mnemonic_passphrase.clone()),
        })
    }

    pub fn with_proof_engine(mut self, proof_engine: ProofEngine) -> Self {
        self.proof_engine = proof_engine;
        self
    }

    /// Revocation slots given to documents created from now on.
    pub fn with_revocation_capacity(mut self, capacity: u32) -> Self {
        self.revocation_capacity = capacity;
        self
    }

    pub fn registry(&self) -> &Arc<ConnectorRegistry> {
        &self.registry
    }

    pub fn proof_engine(&self) -> &ProofEngine {
        &self.proof_engine
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// Root key pair of `mnemonic` under the configured key type and
    /// passphrase.
    pub fn root_key(&self, mnemonic: &str) -> Result<KeyPair, IdentityError> {
        Ok(root_key_pair(
            self.proof_engine.key_type(),
            mnemonic,
            &self.mnemonic_passphrase,
        )?)
    }

    /// Child of [`DocumentManager::root_key`] at `path`.
    pub fn controller_key(
        &self,
        mnemonic: &str,
        path: &DerivationPath,
    ) -> Result<KeyPair, IdentityError> {
        Ok(child_key_pair(&self.root_key(mnemonic)?, path)?)
    }

    /// [`DocumentManager::create_document`] in the default namespace.
    pub async fn create_default_document(
        &self,
        controller: &KeyPair,
    ) -> Result<DidDocument, IdentityError> {
        self.create_document(controller, &self.default_namespace).await
    }

    /// Anchor a new document controlled by `controller` in `namespace`.
    ///
    /// The draft is published unsigned, then signed under its assigned DID
    /// and written back, so the returned document carries a valid proof.
    /// If an earlier call anchored the draft but failed before signing it,
    /// calling again with the same controller finishes that document.
    pub async fn create_document(
        &self,
        controller: &KeyPair,
        namespace: &str,
    ) -> Result<DidDocument, IdentityError> {
        let connector = self.registry.resolve(namespace)?;

        let draft = DidDocument::draft(controller, self.revocation_capacity);
        let mut document = match connector.publish_document(draft).await {
            Ok(did) => fetch(connector.as_ref(), &did).await?,
            Err(ConnectorError::AlreadyExists(uri)) => {
                match unsigned_draft(connector.as_ref(), controller, &uri).await? {
                    Some(document) => {
                        tracing::warn!(did = %uri, namespace, "finishing unsigned DID document");
                        document
                    }
                    None => {
                        return Err(ledger_error(
                            namespace,
                            namespace,
                            ConnectorError::AlreadyExists(uri),
                        ))
                    }
                }
            }
            Err(e) => return Err(ledger_error(namespace, namespace, e)),
        };

        let did = document.did()?;
        let method_id = document
            .find_method_by_public_key(&controller.public_key())
            .map(|vm| vm.id.clone())
            .ok_or_else(|| {
                IdentityError::InvalidDocument(format!(
                    "{} was anchored without its controller key",
                    did
                ))
            })?;
        self.sign(&mut document, controller, &method_id)?;
        if let Err(e) = store(connector.as_ref(), &mut document).await {
            tracing::warn!(did = %did, namespace, error = %e, "DID document anchored but left unsigned");
            return Err(e);
        }

        tracing::info!(did = %did, namespace, "DID document created");
        Ok(document)
    }

    /// Fresh read of the document behind `did`.
    pub async fn resolve_document(&self, did: &Did) -> Result<DidDocument, IdentityError> {
        let connector = self.registry.resolve_for(did)?;
        let document = fetch(connector.as_ref(), did).await?;
        tracing::debug!(did = %did, version = document.version, "DID document resolved");
        Ok(document)
    }

    pub async fn add_verification_method(
        &self,
        did: &Did,
        controller_private_key: &[u8],
        method: VerificationMethod,
    ) -> Result<DidDocument, IdentityError> {
        let method_id = method.id.clone();
        let (document, ()) = self
            .mutate(did, controller_private_key, move |doc| {
                doc.add_verification_method(method)
            })
            .await?;
        tracing::info!(did = %did, method_id = %method_id, "verification method added");
        Ok(document)
    }

    /// Remove a verification method. The last remaining method, and the
    /// method whose key authorizes the call, cannot be removed.
    pub async fn remove_verification_method(
        &self,
        did: &Did,
        controller_private_key: &[u8],
        method_id: &str,
    ) -> Result<DidDocument, IdentityError> {
        let (document, removed) = self
            .mutate(did, controller_private_key, |doc| {
                doc.remove_verification_method(method_id)
            })
            .await?;
        tracing::info!(did = %did, method_id = %removed.id, "verification method removed");
        Ok(document)
    }

    pub async fn add_service(
        &self,
        did: &Did,
        controller_private_key: &[u8],
        service: Service,
    ) -> Result<DidDocument, IdentityError> {
        let service_id = service.id.clone();
        let (document, ()) = self
            .mutate(did, controller_private_key, move |doc| doc.add_service(service))
            .await?;
        tracing::info!(did = %did, service_id = %service_id, "service added");
        Ok(document)
    }

    pub async fn remove_service(
        &self,
        did: &Did,
        controller_private_key: &[u8],
        service_id: &str,
    ) -> Result<DidDocument, IdentityError> {
        let (document, removed) = self
            .mutate(did, controller_private_key, |doc| doc.remove_service(service_id))
            .await?;
        tracing::info!(did = %did, service_id = %removed.id, "service removed");
        Ok(document)
    }

    /// Reserve the next revocation index in the issuer's registry.
    pub async fn allocate_revocation_index(
        &self,
        issuer: &Did,
        issuer_private_key: &[u8],
    ) -> Result<u32, IdentityError> {
        let (_, index) = self
            .mutate(issuer, issuer_private_key, |doc| doc.revocation.allocate())
            .await?;
        tracing::debug!(issuer = %issuer, index, "revocation index allocated");
        Ok(index)
    }

    /// Set the revocation bit at `index`.
    pub async fn revoke_index(
        &self,
        issuer: &Did,
        issuer_private_key: &[u8],
        index: u32,
    ) -> Result<DidDocument, IdentityError> {
        let (document, _) = self
            .mutate(issuer, issuer_private_key, |doc| doc.revocation.set(index))
            .await?;
        Ok(document)
    }

    /// Clear the revocation bit at `index`; fails if it is not set, in
    /// which case nothing is written.
    pub async fn unrevoke_index(
        &self,
        issuer: &Did,
        issuer_private_key: &[u8],
        index: u32,
    ) -> Result<DidDocument, IdentityError> {
        let (document, _) = self
            .mutate(issuer, issuer_private_key, |doc| {
                if doc.revocation.clear(index)? {
                    Ok(())
                } else {
                    Err(IdentityError::NotRevoked {
                        did: doc.id.clone(),
                        index,
                    })
                }
            })
            .await?;
        Ok(document)
    }

    /// Whether `index` is revoked in the issuer's current registry.
    pub async fn is_revoked(&self, issuer: &Did, index: u32) -> Result<bool, IdentityError> {
        let document = self.resolve_document(issuer).await?;
        Ok(document.revocation.is_set(index))
    }

    /// Check a document's proof against the verification method it names.
    ///
    /// Unsigned documents and proofs naming an unknown method verify as
    /// `false`; malformed key or signature material is an error.
    pub fn verify_document(&self, document: &DidDocument) -> Result<bool, IdentityError> {
        let Some(proof) = document.proof.as_ref() else {
            return Ok(false);
        };
        let Some(method) = document.verification_method(&proof.verification_method) else {
            return Ok(false);
        };
        let public_key = method.public_key()?;
        let payload = document.signing_payload()?;
        Ok(self
            .proof_engine
            .verify_proof(public_key.as_bytes(), &payload, proof)?)
    }

    /// Generic read-modify-publish cycle.
    ///
    /// Resolves `did`, checks that `controller_private_key` belongs to one of
    /// its verification methods, applies `apply`, re-signs with the
    /// authorizing method and writes the result. Any failure before the
    /// final write leaves the ledger untouched.
    pub async fn mutate<F, T>(
        &self,
        did: &Did,
        controller_private_key: &[u8],
        apply: F,
    ) -> Result<(DidDocument, T), IdentityError>
    where
        F: FnOnce(&mut DidDocument) -> Result<T, IdentityError> + Send,
        T: Send,
    {
        let controller =
            KeyPair::from_private_key(self.proof_engine.key_type(), controller_private_key)?;
        let connector = self.registry.resolve_for(did)?;
        let mut document = fetch(connector.as_ref(), did).await?;

        let signer_id = match document.find_method_by_public_key(&controller.public_key()) {
            Some(vm) => vm.id.clone(),
            None => {
                tracing::warn!(did = %did, "rejected mutation signed by a key outside the document");
                return Err(IdentityError::UnauthorizedController(did.to_string()));
            }
        };

        let output = apply(&mut document)?;
        if document.verification_method(&signer_id).is_none() {
            return Err(IdentityError::SignerRemoved(signer_id));
        }

        document.updated = Utc::now();
        self.sign(&mut document, &controller, &signer_id)?;
        store(connector.as_ref(), &mut document).await?;
        Ok((document, output))
    }

    fn sign(
        &self,
        document: &mut DidDocument,
        key: &KeyPair,
        method_id: &str,
    ) -> Result<(), IdentityError> {
        let payload = document.signing_payload()?;
        let proof =
            self.proof_engine
                .create_proof(&key.private_key_bytes()[..], method_id, &payload)?;
        document.proof = Some(proof);
        Ok(())
    }
}

impl fmt::Debug for DocumentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentManager")
            .field("registry", &self.registry)
            .field("proof_engine", &self.proof_engine)
            .field("revocation_capacity", &self.revocation_capacity)
            .field("default_namespace", &self.default_namespace)
            .finish_non_exhaustive()
    }
}

async fn fetch(connector: &dyn LedgerConnector, did: &Did) -> Result<DidDocument, IdentityError> {
    connector
        .resolve_document(did)
        .await
        .map_err(|e| ledger_error(connector.namespace(), did.uri(), e))
}

/// The document at `uri` if it is a never-signed draft holding `controller`'s
/// key, i.e. the leftover of a create whose signing write failed.
async fn unsigned_draft(
    connector: &dyn LedgerConnector,
    controller: &KeyPair,
    uri: &str,
) -> Result<Option<DidDocument>, IdentityError> {
    let Ok(did) = Did::new(uri) else {
        return Ok(None);
    };
    let document = fetch(connector, &did).await?;
    let resumable = document.proof.is_none()
        && document
            .find_method_by_public_key(&controller.public_key())
            .is_some();
    Ok(resumable.then_some(document))
}

/// Write `document` and mirror the version bump the ledger applied.
async fn store(
    connector: &dyn LedgerConnector,
    document: &mut DidDocument,
) -> Result<(), IdentityError> {
    connector
        .update_document(document.clone())
        .await
        .map_err(|e| ledger_error(connector.namespace(), &document.id, e))?;
    document.version += 1;
    Ok(())
}

fn ledger_error(namespace: &str, subject: &str, err: ConnectorError) -> IdentityError {
    match err {
        ConnectorError::NotFound(_) => IdentityError::DidNotFound(subject.to_string()),
        source => {
            tracing::debug!(namespace, subject, error = %source, "ledger connector failed");
            IdentityError::Connector {
                namespace: namespace.to_string(),
                source,
            }
        }
    }
}
