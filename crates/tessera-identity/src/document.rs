use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::Did;
use tessera_crypto::{KeyPair, KeyType, PublicKey};
use tessera_proof::Proof;

use crate::error::IdentityError;
use crate::revocation::RevocationRegistry;

/// Fragment of the verification method every new document starts with.
pub const INITIAL_KEY_FRAGMENT: &str = "#keys-1";

/// A verification method within a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// Verification method identifier (e.g., "did:tessera:local:abc#keys-1").
    /// A leading `#` marks an id relative to the owning document.
    pub id: String,
    /// Type of the verification method (e.g., "Ed25519VerificationKey2020").
    pub method_type: String,
    /// The DID that controls this verification method. Empty means the
    /// owning document.
    pub controller: String,
    /// Base58-encoded public key material.
    pub public_key_bs58: String,
}

impl VerificationMethod {
    pub fn new(id: impl Into<String>, key_type: KeyType, public_key: &PublicKey) -> Self {
        Self {
            id: id.into(),
            method_type: key_type.verification_method_type().to_string(),
            controller: String::new(),
            public_key_bs58: public_key.to_bs58(),
        }
    }

    /// Set an explicit controller DID.
    pub fn with_controller(mut self, controller: &Did) -> Self {
        self.controller = controller.to_string();
        self
    }

    /// Decode the key material.
    pub fn public_key(&self) -> Result<PublicKey, IdentityError> {
        Ok(PublicKey::from_bs58(&self.public_key_bs58)?)
    }
}

/// A service endpoint in a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service identifier (e.g., "did:tessera:local:abc#messaging").
    pub id: String,
    /// Service type (e.g., "DIDCommMessaging", "LinkedDomains").
    pub service_type: String,
    /// Service endpoint URL.
    pub service_endpoint: String,
}

impl Service {
    pub fn new(
        id: impl Into<String>,
        service_type: impl Into<String>,
        service_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service_type: service_type.into(),
            service_endpoint: service_endpoint.into(),
        }
    }
}

/// W3C-compatible DID Document anchored on a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    /// The DID subject. Empty until a connector publishes the document.
    pub id: String,
    /// Verification methods (public keys); never empty once published.
    pub verification_methods: Vec<VerificationMethod>,
    /// Service endpoints.
    pub services: Vec<Service>,
    /// Revocation bitmap for credentials this DID issues.
    pub revocation: RevocationRegistry,
    /// Ledger version, bumped by the connector on every accepted update.
    pub version: u64,
    /// When the document was created.
    pub created: DateTime<Utc>,
    /// When the document was last updated.
    pub updated: DateTime<Utc>,
    /// Controller signature over [`DidDocument::signing_payload`].
    pub proof: Option<Proof>,
}

/// Everything a proof covers. `version` is left out because the ledger
/// bumps it after the controller signs.
#[derive(Serialize)]
struct SigningView<'a> {
    id: &'a str,
    verification_methods: &'a [VerificationMethod],
    services: &'a [Service],
    revocation: &'a RevocationRegistry,
    created: &'a DateTime<Utc>,
    updated: &'a DateTime<Utc>,
}

impl DidDocument {
    /// Unpublished document with a single verification method for
    /// `controller`. Ids stay relative until [`DidDocument::bind`].
    pub fn draft(controller: &KeyPair, revocation_capacity: u32) -> Self {
        let now = Utc::now();
        let vm = VerificationMethod::new(
            INITIAL_KEY_FRAGMENT,
            controller.key_type(),
            &controller.public_key(),
        );
        Self {
            id: String::new(),
            verification_methods: vec![vm],
            services: Vec::new(),
            revocation: RevocationRegistry::new(revocation_capacity),
            version: 0,
            created: now,
            updated: now,
            proof: None,
        }
    }

    /// Attach the document to its ledger-assigned DID, making relative ids
    /// absolute and filling empty controllers.
    pub fn bind(&mut self, did: &Did) {
        self.id = did.to_string();
        for vm in &mut self.verification_methods {
            vm.id = absolute_id(did.uri(), &vm.id);
            if vm.controller.is_empty() {
                vm.controller = did.to_string();
            }
        }
        for service in &mut self.services {
            service.id = absolute_id(did.uri(), &service.id);
        }
    }

    /// Parsed DID; fails for unpublished drafts.
    pub fn did(&self) -> Result<Did, IdentityError> {
        Ok(Did::new(self.id.as_str())?)
    }

    /// Look up a verification method by absolute or `#`-relative id.
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        let id = absolute_id(&self.id, id);
        self.verification_methods.iter().find(|vm| vm.id == id)
    }

    /// The verification method holding `public_key`, if any.
    pub fn find_method_by_public_key(&self, public_key: &PublicKey) -> Option<&VerificationMethod> {
        let encoded = public_key.to_bs58();
        self.verification_methods
            .iter()
            .find(|vm| vm.public_key_bs58 == encoded)
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        let id = absolute_id(&self.id, id);
        self.services.iter().find(|s| s.id == id)
    }

    pub fn add_verification_method(
        &mut self,
        mut method: VerificationMethod,
    ) -> Result<(), IdentityError> {
        method.public_key()?;
        method.id = absolute_id(&self.id, &method.id);
        if method.controller.is_empty() {
            method.controller = self.id.clone();
        }
        if self.verification_methods.iter().any(|vm| vm.id == method.id) {
            return Err(IdentityError::DuplicateMethod(method.id));
        }
        self.verification_methods.push(method);
        Ok(())
    }

    /// Remove a verification method; the last one can never be removed.
    pub fn remove_verification_method(
        &mut self,
        id: &str,
    ) -> Result<VerificationMethod, IdentityError> {
        let id = absolute_id(&self.id, id);
        let position = self
            .verification_methods
            .iter()
            .position(|vm| vm.id == id)
            .ok_or_else(|| IdentityError::MethodNotFound(id.clone()))?;
        if self.verification_methods.len() == 1 {
            return Err(IdentityError::LastVerificationMethod(id));
        }
        Ok(self.verification_methods.remove(position))
    }

    pub fn add_service(&mut self, mut service: Service) -> Result<(), IdentityError> {
        service.id = absolute_id(&self.id, &service.id);
        if self.services.iter().any(|s| s.id == service.id) {
            return Err(IdentityError::DuplicateService(service.id));
        }
        self.services.push(service);
        Ok(())
    }

    pub fn remove_service(&mut self, id: &str) -> Result<Service, IdentityError> {
        let id = absolute_id(&self.id, id);
        let position = self
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or(IdentityError::ServiceNotFound(id))?;
        Ok(self.services.remove(position))
    }

    /// Deterministic JSON of the document without `proof` and `version`.
    pub fn signing_payload(&self) -> Result<Vec<u8>, IdentityError> {
        let view = SigningView {
            id: &self.id,
            verification_methods: &self.verification_methods,
            services: &self.services,
            revocation: &self.revocation,
            created: &self.created,
            updated: &self.updated,
        };
        serde_json::to_vec(&view).map_err(|e| IdentityError::Serialization(e.to_string()))
    }
}

fn absolute_id(document_id: &str, id: &str) -> String {
    if id.starts_with('#') && !document_id.is_empty() {
        format!("{}{}", document_id, id)
    } else {
        id.to_string()
    }
}
