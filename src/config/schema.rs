//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::filter::FilterSettings;
use crate::gateway::DEFAULT_BLOCK_SIZE;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener and application settings.
    pub server: ServerConfig,

    /// X-Accel-Redirect settings.
    pub redirect: RedirectConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener and application settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Directory served by the static file application.
    pub document_root: PathBuf,

    /// Offer the host's streaming file wrapper to applications.
    pub file_wrapper: bool,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Block size used when reading files.
    pub block_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            document_root: PathBuf::from("."),
            file_wrapper: true,
            request_timeout_secs: 30,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// X-Accel-Redirect settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Wrap the application in the redirect filter.
    pub enabled: bool,

    /// Mapping rules passed to every request as `X_REDIRECT_MAP`,
    /// e.g. "/var/www/=/protected/".
    pub map: Option<String>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            map: None,
        }
    }
}

impl RedirectConfig {
    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            disabled: !self.enabled,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
