//! X-Accel-Redirect filter.
//!
//! # Data Flow
//! ```text
//! request environ (X_REDIRECT_MAP)
//!     → mapper.rs (parse rules; disabled when absent or non-ASCII)
//!     → marker.rs (installed as the environ's file wrapper)
//!     → capture.rs (installed as the response starter)
//!     → wrapped application
//!     → body is FileMarker and path maps?
//!         yes: drop Content-Length, add X-Accel-Redirect, empty body
//!         no:  hand the file to the previous file wrapper, if any
//!     → commit status + headers downstream
//! ```
//!
//! # Design Decisions
//! - Stateless across requests; all capture state lives on the call stack
//! - Redirecting is best effort: every failure degrades to normal file serving
//! - Application errors propagate untouched

pub mod capture;
pub mod mapper;
pub mod marker;

use std::sync::Arc;

use axum::http::header::{HeaderName, HeaderValue, CONTENT_LENGTH};

use crate::gateway::{Application, Body, Environ, FileWrapper, GatewayError, Responder};

pub use capture::{CaptureState, ResponseCapture};
pub use mapper::{MappingRule, NotAscii, RedirectMap};
pub use marker::{FileMarker, MarkerWrapper};

/// Environ key carrying the comma-separated mapping rules.
pub const X_REDIRECT_MAP: &str = "X_REDIRECT_MAP";

/// Internal redirect header understood by nginx.
pub static X_ACCEL_REDIRECT: HeaderName = HeaderName::from_static("x-accel-redirect");

/// Settings for configuration-driven construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterSettings {
    /// Skip the filter entirely and serve the application as-is.
    pub disabled: bool,
}

/// Wrap `app` so mapped file responses become internal redirects.
pub fn xsendfile<A: Application>(app: A) -> XSendfile<A> {
    XSendfile::new(app)
}

/// Factory used by hosts that assemble their pipeline from configuration.
pub fn filter_app_factory<A>(app: A, settings: &FilterSettings) -> Arc<dyn Application>
where
    A: Application + 'static,
{
    if settings.disabled {
        tracing::info!("X-Accel-Redirect filter disabled by configuration");
        Arc::new(app)
    } else {
        Arc::new(XSendfile::new(app))
    }
}

/// Application wrapper that replaces mapped file bodies with `X-Accel-Redirect`.
#[derive(Debug, Clone)]
pub struct XSendfile<A> {
    app: A,
}

impl<A: Application> XSendfile<A> {
    pub fn new(app: A) -> Self {
        Self { app }
    }

    fn call_filtered(
        &self,
        redirect_map: &RedirectMap,
        environ: &mut Environ,
        responder: &mut dyn Responder,
        orig_file_wrapper: Option<Arc<dyn FileWrapper>>,
    ) -> Result<Body, GatewayError> {
        let mut capture = ResponseCapture::new(&mut *responder);
        let result = self.app.call(environ, &mut capture)?;

        let (status, mut headers) = match capture.finish() {
            CaptureState::Committed => return Ok(result),
            CaptureState::NotStarted => return Err(GatewayError::StartResponseNeverCalled),
            CaptureState::Pending { status, headers } => (status, headers),
        };

        let result = match result {
            Body::File(marker) => match redirect_uri(redirect_map, &marker) {
                Some((uri, value)) => {
                    // nginx ignores the status once X-Accel-Redirect is set.
                    tracing::debug!(redirect_uri = %uri, filename = ?marker.path(), "X-Accel-Redirect");
                    headers.remove(CONTENT_LENGTH);
                    headers.remove(&X_ACCEL_REDIRECT);
                    headers.insert(X_ACCEL_REDIRECT.clone(), value);
                    marker.close();
                    Body::empty()
                }
                None => match orig_file_wrapper {
                    Some(wrapper) => {
                        let (file, block_size) = marker.into_parts();
                        wrapper.wrap(file, block_size)
                    }
                    None => Body::File(marker),
                },
            },
            other => other,
        };

        responder.start_response(status, headers, None)?;
        Ok(result)
    }
}

/// Redirect URI for a marker's file, with the header value ready to send.
fn redirect_uri(redirect_map: &RedirectMap, marker: &FileMarker) -> Option<(String, HeaderValue)> {
    let uri = redirect_map.map_path(marker.path()?)?;
    match HeaderValue::from_str(&uri) {
        Ok(value) => Some((uri, value)),
        Err(e) => {
            tracing::warn!(redirect_uri = %uri, error = %e, "Redirect URI is not a valid header value");
            None
        }
    }
}

/// Mapping rules for this request, or `None` when the filter should stay out.
fn request_redirect_map(environ: &Environ) -> Option<RedirectMap> {
    let raw = environ.var(X_REDIRECT_MAP).filter(|s| !s.is_empty())?;
    match RedirectMap::parse(raw) {
        Ok(redirect_map) if !redirect_map.is_empty() => Some(redirect_map),
        Ok(_) => None,
        Err(e) => {
            tracing::info!(value = %e.0, "Ignoring non-ASCII value for X_REDIRECT_MAP");
            None
        }
    }
}

impl<A: Application> Application for XSendfile<A> {
    fn call(&self, environ: &mut Environ, responder: &mut dyn Responder) -> Result<Body, GatewayError> {
        let Some(redirect_map) = request_redirect_map(environ) else {
            return self.app.call(environ, responder);
        };

        let orig_file_wrapper = environ.replace_file_wrapper(Some(Arc::new(MarkerWrapper)));
        let result = self.call_filtered(&redirect_map, environ, responder, orig_file_wrapper.clone());
        environ.replace_file_wrapper(orig_file_wrapper);
        result
    }
}
