use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Decentralized Identifier.
/// Format: `did:<method>:<namespace>:<identifier>`
///
/// The namespace selects the ledger connector; the identifier is assigned by
/// that connector and is opaque here (it may itself contain colons).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parse and validate a full DID URI.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        let parts: Vec<&str> = uri.splitn(4, ':').collect();
        if parts.len() < 4 || parts[0] != "did" {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format 'did:<method>:<namespace>:<identifier>', got: {}",
                uri
            )));
        }
        if parts[1..].iter().any(|p| p.is_empty()) {
            return Err(CoreError::InvalidDid(format!(
                "DID segments must be non-empty, got: {}",
                uri
            )));
        }
        if parts[1].contains('#') || parts[2].contains('#') || parts[3].contains('#') {
            return Err(CoreError::InvalidDid(format!(
                "DID must not contain a fragment, got: {}",
                uri
            )));
        }
        Ok(Self(uri))
    }

    /// Build a DID from its components.
    pub fn from_parts(method: &str, namespace: &str, identifier: &str) -> Result<Self, CoreError> {
        Self::new(format!("did:{}:{}:{}", method, namespace, identifier))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// The DID method (e.g. `tessera`).
    pub fn method(&self) -> &str {
        self.segment(1)
    }

    /// The ledger namespace used to select a connector.
    pub fn namespace(&self) -> &str {
        self.segment(2)
    }

    /// Connector-assigned identifier.
    pub fn identifier(&self) -> &str {
        self.segment(3)
    }

    /// A DID URL pointing at a fragment within this DID's document.
    pub fn with_fragment(&self, fragment: &str) -> String {
        format!("{}#{}", self.0, fragment.trim_start_matches('#'))
    }

    fn segment(&self, n: usize) -> &str {
        // Validated in `new`, so every segment is present.
        self.0.splitn(4, ':').nth(n).unwrap_or_default()
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
