pub mod connector;
pub mod document;
pub mod error;
pub mod manager;
pub mod memory_ledger;
pub mod registry;
pub mod resolver;
pub mod revocation;

pub use connector::{ConnectorError, LedgerConnector};
pub use document::{DidDocument, Service, VerificationMethod};
pub use error::IdentityError;
pub use manager::DocumentManager;
pub use memory_ledger::InMemoryLedger;
pub use registry::ConnectorRegistry;
pub use resolver::DidResolver;
pub use revocation::{RevocationRegistry, DEFAULT_REVOCATION_CAPACITY};
