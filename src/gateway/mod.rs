//! Synchronous handler contract between the HTTP host and applications.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → environ.rs (request variables + file wrapper facility)
//!     → Application::call(environ, responder)
//!         → responder.rs (start_response, write)
//!         → body.rs (chunk sequence or file-send intent)
//!     → host streams status, headers, written bytes, then body chunks
//! ```
//!
//! # Design Decisions
//! - One call per request; no state survives between requests
//! - The body is a sum type so "send this file" is an explicit variant
//! - Applications may write directly through the responder before returning
//! - Exception info passed to `start_response` is re-raised once output was sent

pub mod body;
pub mod environ;
pub mod error;
pub mod file;
pub mod responder;

pub use body::{Body, Chunks};
pub use environ::Environ;
pub use error::{ExcInfo, GatewayError};
pub use file::{FileChunks, FileHandle, FileWrapper, NamedFile, StreamingFileWrapper, DEFAULT_BLOCK_SIZE};
pub use responder::{HostResponder, Responder, StartedResponse};

/// An application served through the gateway.
pub trait Application: Send + Sync {
    /// Handle one request.
    ///
    /// The application must call `responder.start_response` exactly once
    /// (twice only to report an error through exception info) before its
    /// returned body is consumed.
    fn call(&self, environ: &mut Environ, responder: &mut dyn Responder) -> Result<Body, GatewayError>;
}

impl<F> Application for F
where
    F: Fn(&mut Environ, &mut dyn Responder) -> Result<Body, GatewayError> + Send + Sync,
{
    fn call(&self, environ: &mut Environ, responder: &mut dyn Responder) -> Result<Body, GatewayError> {
        self(environ, responder)
    }
}

/// Run `app` against the host's own starter and assemble the response.
pub fn run_application(app: &dyn Application, environ: &mut Environ) -> Result<StartedResponse, GatewayError> {
    let mut responder = HostResponder::new();
    let body = app.call(environ, &mut responder)?;
    responder.finish(body)
}
