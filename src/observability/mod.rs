//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! filter, gateway, server
//!     → tracing events with structured fields (redirect_uri, filename, request_id)
//!     → logging.rs (fmt subscriber, EnvFilter)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Non-ASCII mapping input is logged at info, never raised

pub mod logging;
