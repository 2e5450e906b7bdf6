use async_trait::async_trait;
use tessera_core::Did;

use crate::document::DidDocument;

/// Failures reported by a ledger backend.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("version conflict: write based on version {expected}, ledger holds {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("ledger backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ConnectorError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ConnectorError::Backend(err.into())
    }
}

/// Ledger connector interface.
///
/// One implementation per ledger family, selected by the namespace segment
/// of a DID. Timeouts and retries are the connector's business.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Namespace this connector anchors documents in.
    fn namespace(&self) -> &str;

    /// Fetch the current document for `did`.
    async fn resolve_document(&self, did: &Did) -> Result<DidDocument, ConnectorError>;

    /// Anchor a draft document, assigning and returning its DID.
    ///
    /// The stored document is the draft bound to the new DID at version 0.
    async fn publish_document(&self, draft: DidDocument) -> Result<Did, ConnectorError>;

    /// Replace a published document.
    ///
    /// Fails with [`ConnectorError::VersionConflict`] unless `document.version`
    /// matches the stored version; on success the stored version is bumped.
    async fn update_document(&self, document: DidDocument) -> Result<(), ConnectorError>;
}
