//! Structured logging bootstrap for applications embedding Tessera.
//!
//! Library crates only emit `tracing` events; the composing application
//! decides whether and how to install a subscriber.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::CoreError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output.
    Text,
    /// Machine-parseable JSON lines.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json" or "text"/"pretty" (case-insensitive).
    /// Returns `Text` for any unrecognized value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CoreError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let format = LogFormat::from_str_lossy(&config.format);

    let result = match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .try_init(),
    };
    result.map_err(|e| CoreError::Config(format!("logging init failed: {}", e)))?;

    tracing::info!(format = ?format, "logging initialized");
    Ok(())
}
