use async_trait::async_trait;
use tessera_core::Did;

use crate::document::DidDocument;
use crate::error::IdentityError;
use crate::manager::DocumentManager;

/// Trait for resolving DIDs to their documents.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve a DID to its current DID Document.
    async fn resolve(&self, did: &Did) -> Result<DidDocument, IdentityError>;
}

#[async_trait]
impl DidResolver for DocumentManager {
    async fn resolve(&self, did: &Did) -> Result<DidDocument, IdentityError> {
        self.resolve_document(did).await
    }
}
