//! HTTP host for gateway applications.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, trace + timeout layers)
//!     → host.rs (request → Environ, X_REDIRECT_MAP injected)
//!     → application on the blocking pool
//!     → status + headers, then body chunks over a bounded channel
//!     → client (or nginx, which follows X-Accel-Redirect)
//! ```

pub mod host;
pub mod server;

pub use host::HostSettings;
pub use server::HttpServer;
