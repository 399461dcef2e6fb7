//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use xsendfile_filter::gateway::{ExcInfo, FileHandle, FileWrapper};
use xsendfile_filter::{Application, Body, Environ, GatewayError, Responder};

/// Strict response starter: re-raises exception info when nothing was
/// written yet and refuses a second ordinary start.
#[derive(Default)]
pub struct StrictResponder {
    head: Option<(StatusCode, HeaderMap)>,
    output: Vec<Bytes>,
}

impl Responder for StrictResponder {
    fn start_response(
        &mut self,
        status: StatusCode,
        headers: HeaderMap,
        exc_info: Option<ExcInfo>,
    ) -> Result<(), GatewayError> {
        if let Some(exc) = exc_info {
            if self.output.is_empty() {
                return Err(GatewayError::Application(exc));
            }
        } else if self.head.is_some() {
            return Err(GatewayError::ResponseAlreadyStarted);
        }
        self.head = Some((status, headers));
        Ok(())
    }

    fn write(&mut self, data: Bytes) -> Result<(), GatewayError> {
        self.output.push(data);
        Ok(())
    }
}

/// A fully materialised response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
    pub written: Vec<Bytes>,
}

impl TestResponse {
    /// Written bytes followed by the body chunks.
    pub fn chunks(self) -> Vec<Bytes> {
        let mut chunks = self.written;
        chunks.extend(self.body.into_chunks().map(|c| c.unwrap()));
        chunks
    }

    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

/// Call `app` the way a strict host would.
pub fn get_response(app: &dyn Application, environ: &mut Environ) -> Result<TestResponse, GatewayError> {
    let mut responder = StrictResponder::default();
    let body = app.call(environ, &mut responder)?;
    let (status, headers) = responder.head.ok_or(GatewayError::StartResponseNeverCalled)?;
    Ok(TestResponse {
        status,
        headers,
        body,
        written: responder.output,
    })
}

/// Every call a downstream starter received.
#[derive(Debug, PartialEq)]
pub enum Call {
    Start(StatusCode, bool),
    Write(Bytes),
}

#[derive(Default)]
pub struct RecordingResponder {
    pub calls: Vec<Call>,
}

impl Responder for RecordingResponder {
    fn start_response(
        &mut self,
        status: StatusCode,
        _headers: HeaderMap,
        exc_info: Option<ExcInfo>,
    ) -> Result<(), GatewayError> {
        self.calls.push(Call::Start(status, exc_info.is_some()));
        Ok(())
    }

    fn write(&mut self, data: Bytes) -> Result<(), GatewayError> {
        self.calls.push(Call::Write(data));
        Ok(())
    }
}

/// In-memory file with a name.
pub struct DummyFile {
    path: PathBuf,
    data: Cursor<Vec<u8>>,
}

impl DummyFile {
    pub fn boxed(path: &str, data: &[u8]) -> Box<dyn FileHandle> {
        Box::new(Self {
            path: PathBuf::from(path),
            data: Cursor::new(data.to_vec()),
        })
    }
}

impl Read for DummyFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl FileHandle for DummyFile {
    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Host file wrapper that reports what it was handed instead of reading.
pub struct DummyFileWrapper;

impl FileWrapper for DummyFileWrapper {
    fn wrap(&self, file: Box<dyn FileHandle>, block_size: usize) -> Body {
        let path = file.path().map(|p| p.display().to_string()).unwrap_or_default();
        Body::from(format!("wrapped {path} {block_size}"))
    }
}

#[derive(Debug)]
pub struct DummyException;

impl std::fmt::Display for DummyException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dummy exception")
    }
}

impl std::error::Error for DummyException {}
