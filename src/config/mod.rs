//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!
//! command line
//!     → overrides.rs (layered over the file values)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → overrides.rs re-applies the command line values
//!     → validation.rs validates
//!     → server swaps in the new redirect settings
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file is a valid config
//! - Validation collects every error instead of stopping at the first
//! - Only redirect settings are applied live; the listener needs a restart

pub mod loader;
pub mod overrides;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_with_overrides, ConfigError};
pub use overrides::ConfigOverrides;
pub use schema::{GatewayConfig, ObservabilityConfig, RedirectConfig, ServerConfig};
