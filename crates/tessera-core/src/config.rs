//! Configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// W3C Verifiable Credentials v1 context.
pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Full configuration for a Tessera deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TesseraConfig {
    /// DID and key settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Credential issuance settings.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// The `<method>` segment of every DID minted by this deployment.
    #[serde(default = "default_did_method")]
    pub did_method: String,
    /// Namespace used when the caller does not pick one.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,
    /// Key type for root and child key pairs.
    #[serde(default = "default_key_type")]
    pub key_type: String,
    /// BIP-39 passphrase applied when turning a mnemonic into a seed.
    #[serde(default)]
    pub mnemonic_passphrase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Maximum number of revocation slots per issuer.
    #[serde(default = "default_revocation_capacity")]
    pub revocation_capacity: u32,
    /// JSON-LD contexts stamped on every new credential.
    #[serde(default = "default_contexts")]
    pub default_contexts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_did_method() -> String {
    "tessera".into()
}
fn default_namespace() -> String {
    "local".into()
}
fn default_key_type() -> String {
    "Ed25519".into()
}
fn default_revocation_capacity() -> u32 {
    131_072
}
fn default_contexts() -> Vec<String> {
    vec![CREDENTIALS_V1_CONTEXT.into()]
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            did_method: default_did_method(),
            default_namespace: default_namespace(),
            key_type: default_key_type(),
            mnemonic_passphrase: String::new(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            revocation_capacity: default_revocation_capacity(),
            default_contexts: default_contexts(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TesseraConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: TesseraConfig = toml::from_str(&contents)
                .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check the values that would otherwise produce malformed DIDs.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("identity.did_method", &self.identity.did_method),
            ("identity.default_namespace", &self.identity.default_namespace),
        ] {
            if value.is_empty() || value.contains(':') || value.contains('#') {
                return Err(CoreError::Config(format!(
                    "{} must be a non-empty DID segment, got '{}'",
                    field, value
                )));
            }
        }
        if self.credentials.revocation_capacity == 0 {
            return Err(CoreError::Config(
                "credentials.revocation_capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}
