//! X-Accel-Redirect response filter.
//!
//! Wraps a gateway application so that file responses whose path matches a
//! configured prefix mapping are replaced by an `X-Accel-Redirect` header,
//! letting nginx stream the file instead of the application process.

pub mod apps;
pub mod config;
pub mod filter;
pub mod gateway;
pub mod http;
pub mod observability;

pub use config::GatewayConfig;
pub use filter::{filter_app_factory, xsendfile, XSendfile, X_ACCEL_REDIRECT, X_REDIRECT_MAP};
pub use gateway::{Application, Body, Environ, GatewayError, Responder};
pub use http::HttpServer;
