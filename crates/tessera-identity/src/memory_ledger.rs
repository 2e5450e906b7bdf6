use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tessera_core::{Did, IdentityConfig};

use crate::connector::{ConnectorError, LedgerConnector};
use crate::document::DidDocument;

/// DID method used when none is configured.
pub const DEFAULT_DID_METHOD: &str = "tessera";

/// In-memory ledger connector.
///
/// Stores documents in a `DashMap` keyed by DID URI. Identifiers are
/// derived from the initial controller key, so the same key cannot anchor
/// two documents in one ledger. Useful for tests and single-node setups.
pub struct InMemoryLedger {
    method: String,
    namespace: String,
    documents: DashMap<String, DidDocument>,
}

impl InMemoryLedger {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_method(DEFAULT_DID_METHOD, namespace)
    }

    pub fn with_method(method: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            namespace: namespace.into(),
            documents: DashMap::new(),
        }
    }

    /// Ledger minting `did:<identity.did_method>:<namespace>:...`.
    pub fn from_config(config: &IdentityConfig, namespace: impl Into<String>) -> Self {
        Self::with_method(config.did_method.clone(), namespace)
    }

    /// Number of anchored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn identifier_for(draft: &DidDocument) -> Result<String, ConnectorError> {
        let first = draft
            .verification_methods
            .first()
            .ok_or_else(|| ConnectorError::backend("draft has no verification method"))?;
        let public_key = first.public_key().map_err(ConnectorError::backend)?;
        let digest = tessera_crypto::hash(public_key.as_bytes());
        Ok(bs58::encode(&digest[..16]).into_string())
    }
}

#[async_trait]
impl LedgerConnector for InMemoryLedger {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn resolve_document(&self, did: &Did) -> Result<DidDocument, ConnectorError> {
        self.documents
            .get(did.uri())
            .map(|entry| entry.clone())
            .ok_or_else(|| ConnectorError::NotFound(did.to_string()))
    }

    async fn publish_document(&self, mut draft: DidDocument) -> Result<Did, ConnectorError> {
        let identifier = Self::identifier_for(&draft)?;
        let did = Did::from_parts(&self.method, &self.namespace, &identifier)
            .map_err(ConnectorError::backend)?;

        match self.documents.entry(did.to_string()) {
            Entry::Occupied(_) => Err(ConnectorError::AlreadyExists(did.to_string())),
            Entry::Vacant(slot) => {
                draft.bind(&did);
                draft.version = 0;
                slot.insert(draft);
                tracing::debug!(did = %did, namespace = %self.namespace, "document anchored");
                Ok(did)
            }
        }
    }

    async fn update_document(&self, mut document: DidDocument) -> Result<(), ConnectorError> {
        let mut stored = self
            .documents
            .get_mut(&document.id)
            .ok_or_else(|| ConnectorError::NotFound(document.id.clone()))?;
        if stored.version != document.version {
            return Err(ConnectorError::VersionConflict {
                expected: document.version,
                actual: stored.version,
            });
        }
        document.version += 1;
        tracing::debug!(did = %document.id, version = document.version, "document updated");
        *stored = document;
        Ok(())
    }
}
