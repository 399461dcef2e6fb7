//! Bridge between axum requests and the synchronous gateway contract.
//!
//! # Responsibilities
//! - Build an `Environ` from the request line and headers
//! - Inject the configured redirect map and file wrapper
//! - Run the application off the async runtime and stream its body
//!
//! # Design Decisions
//! - Request headers become `HTTP_*` variables, so clients cannot set
//!   `X_REDIRECT_MAP` themselves
//! - The body is pulled on the blocking thread; a full channel applies
//!   backpressure to file reads

use std::io;
use std::sync::Arc;

use axum::body::Body as HttpBody;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};

use crate::config::GatewayConfig;
use crate::filter::X_REDIRECT_MAP;
use crate::gateway::{run_application, Application, Environ, GatewayError, StartedResponse, StreamingFileWrapper};

const CHUNK_CHANNEL_CAPACITY: usize = 4;

/// Per-request settings taken from the live configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSettings {
    /// Value injected as `X_REDIRECT_MAP`.
    pub redirect_map: Option<String>,
    /// Offer `StreamingFileWrapper` to applications.
    pub file_wrapper: bool,
}

impl From<&GatewayConfig> for HostSettings {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            redirect_map: config.redirect.map.clone(),
            file_wrapper: config.server.file_wrapper,
        }
    }
}

/// Build the environ for one request.
pub fn build_environ<B>(request: &Request<B>, settings: &HostSettings, request_id: &str) -> Environ {
    let uri = request.uri();
    let mut environ = Environ::new()
        .with_var("REQUEST_METHOD", request.method().as_str())
        .with_var("PATH_INFO", uri.path())
        .with_var("QUERY_STRING", uri.query().unwrap_or(""))
        .with_var("SERVER_PROTOCOL", format!("{:?}", request.version()))
        .with_var("REQUEST_ID", request_id);

    for name in request.headers().keys() {
        let values: Vec<&str> = request
            .headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            continue;
        }
        let key = name.as_str().to_ascii_uppercase().replace('-', "_");
        let key = match key.as_str() {
            "CONTENT_TYPE" | "CONTENT_LENGTH" => key,
            _ => format!("HTTP_{key}"),
        };
        environ.set_var(key, values.join(","));
    }

    if let Some(map) = &settings.redirect_map {
        environ.set_var(X_REDIRECT_MAP, map.as_str());
    }
    if settings.file_wrapper {
        environ = environ.with_file_wrapper(Arc::new(StreamingFileWrapper));
    }
    environ
}

/// Run the application on the blocking pool and turn its output into an
/// HTTP response.
pub async fn serve_environ(app: Arc<dyn Application>, mut environ: Environ, request_id: String) -> Response {
    let (head_tx, head_rx) = oneshot::channel::<Result<(StatusCode, HeaderMap), GatewayError>>();
    let (chunk_tx, chunk_rx) = mpsc::channel::<io::Result<Bytes>>(CHUNK_CHANNEL_CAPACITY);
    let span = tracing::debug_span!("application", request_id = %request_id);

    tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let StartedResponse { status, headers, chunks } = match run_application(app.as_ref(), &mut environ) {
            Ok(started) => started,
            Err(e) => {
                let _ = head_tx.send(Err(e));
                return;
            }
        };
        if head_tx.send(Ok((status, headers))).is_err() {
            return;
        }
        for chunk in chunks {
            if chunk_tx.blocking_send(chunk).is_err() {
                tracing::debug!("Client went away, dropping remaining body");
                break;
            }
        }
    });

    match head_rx.await {
        Ok(Ok((status, headers))) => {
            let stream = futures_util::stream::unfold(chunk_rx, |mut rx| async move {
                rx.recv().await.map(|chunk| (chunk, rx))
            });
            let mut response = Response::new(HttpBody::from_stream(stream));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Application failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        Err(_) => {
            tracing::error!(request_id = %request_id, "Application task ended without a response");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
