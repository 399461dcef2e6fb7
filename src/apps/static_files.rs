//! Static file application.
//!
//! # Responsibilities
//! - Map `PATH_INFO` onto a file under the document root
//! - Declare `Content-Type` and `Content-Length`
//! - Hand the open file to the environ's file wrapper
//!
//! # Design Decisions
//! - `..` segments are refused outright rather than normalised
//! - Directories fall back to `index.html`
//! - HEAD declares the same headers but sends no body

use std::io;
use std::path::{Path, PathBuf};

use axum::http::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};

use crate::gateway::{Application, Body, Environ, GatewayError, NamedFile, Responder, DEFAULT_BLOCK_SIZE};

/// Serves files from a document root.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    block_size: usize,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a request path, or `None` when it escapes the root.
    fn resolve(&self, path_info: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for segment in path_info.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                s if s.contains('\\') => return None,
                s => path.push(s),
            }
        }
        if path.is_dir() {
            path.push("index.html");
        }
        Some(path)
    }
}

fn plain_response(
    responder: &mut dyn Responder,
    status: StatusCode,
    mut headers: HeaderMap,
) -> Result<Body, GatewayError> {
    let text = status.canonical_reason().unwrap_or("Error").to_string();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(text.len()));
    responder.start_response(status, headers, None)?;
    Ok(Body::from(text))
}

impl Application for StaticFiles {
    fn call(&self, environ: &mut Environ, responder: &mut dyn Responder) -> Result<Body, GatewayError> {
        let method = environ.var("REQUEST_METHOD").unwrap_or("GET");
        let head_only = match method {
            "GET" => false,
            "HEAD" => true,
            _ => {
                let mut headers = HeaderMap::new();
                headers.insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
                return plain_response(responder, StatusCode::METHOD_NOT_ALLOWED, headers);
            }
        };

        let path_info = environ.var("PATH_INFO").unwrap_or("/");
        let Some(path) = self.resolve(path_info) else {
            tracing::debug!(path_info, "Refusing path outside document root");
            return plain_response(responder, StatusCode::NOT_FOUND, HeaderMap::new());
        };

        let file = match NamedFile::open(&path) {
            Ok(file) => file,
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) => {
                tracing::debug!(path = %path.display(), error = %e, "File not served");
                return plain_response(responder, StatusCode::NOT_FOUND, HeaderMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata()?.len();

        let mime = mime_guess::from_path(&path).first_or_octet_stream();
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
            headers.insert(CONTENT_TYPE, value);
        }
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        responder.start_response(StatusCode::OK, headers, None)?;

        if head_only {
            return Ok(Body::empty());
        }
        Ok(environ.send_file(Box::new(file), self.block_size))
    }
}
