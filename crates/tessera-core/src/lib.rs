//! Shared Tessera building blocks: the DID type, the credential state
//! machine, the error taxonomy, configuration and logging bootstrap.

pub mod config;
pub mod credential_state;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{CredentialsConfig, IdentityConfig, LoggingConfig, TesseraConfig};
pub use credential_state::{CredentialEvent, CredentialState, CredentialStateMachine};
pub use error::{CoreError, ErrorKind};
pub use types::Did;
