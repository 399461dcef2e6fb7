//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, block size > 0)
//! - Check the redirect map is ASCII and carries at least one rule
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::filter::RedirectMap;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("server.document_root {0:?} is not a directory")]
    MissingDocumentRoot(PathBuf),

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("server.block_size must be greater than zero")]
    ZeroBlockSize,

    #[error("redirect.map must be ASCII")]
    NonAsciiRedirectMap,

    #[error("redirect.map contains no mapping rules")]
    EmptyRedirectMap,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.server.bind_address.clone()));
    }
    if !config.server.document_root.is_dir() {
        errors.push(ValidationError::MissingDocumentRoot(config.server.document_root.clone()));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.server.block_size == 0 {
        errors.push(ValidationError::ZeroBlockSize);
    }

    if let Some(map) = &config.redirect.map {
        match RedirectMap::parse(map) {
            Ok(redirect_map) if redirect_map.is_empty() => errors.push(ValidationError::EmptyRedirectMap),
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::NonAsciiRedirectMap),
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
