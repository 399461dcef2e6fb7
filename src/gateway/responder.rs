//! Response starters.
//!
//! # Responsibilities
//! - Define the `start_response` / `write` contract applications call
//! - Provide the host-side starter that assembles the final response
//!
//! # Design Decisions
//! - Direct writes are buffered and emitted before the returned body
//! - Exception info replaces the pending status while nothing was written,
//!   and is re-raised once output exists
//! - An ordinary second `start_response` is a contract violation

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

use crate::gateway::{Body, Chunks, ExcInfo, GatewayError};

/// The response-starting callback handed to an application.
pub trait Responder {
    /// Declare status and headers. `exc_info` marks a correcting call made
    /// while handling an error.
    fn start_response(
        &mut self,
        status: StatusCode,
        headers: HeaderMap,
        exc_info: Option<ExcInfo>,
    ) -> Result<(), GatewayError>;

    /// Write body bytes directly, ahead of the returned body.
    fn write(&mut self, data: Bytes) -> Result<(), GatewayError>;
}

/// A fully started response, ready to be streamed.
pub struct StartedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Directly written bytes first, then the returned body.
    pub chunks: Chunks,
}

impl std::fmt::Debug for StartedResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartedResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// The host's own response starter.
#[derive(Debug, Default)]
pub struct HostResponder {
    head: Option<(StatusCode, HeaderMap)>,
    output: Vec<Bytes>,
}

impl HostResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.head.is_some()
    }

    /// Combine the recorded head and written bytes with the returned body.
    pub fn finish(self, body: Body) -> Result<StartedResponse, GatewayError> {
        let (status, headers) = self.head.ok_or(GatewayError::StartResponseNeverCalled)?;
        let written = self.output.into_iter().map(Ok);
        Ok(StartedResponse {
            status,
            headers,
            chunks: Box::new(written.chain(body.into_chunks())),
        })
    }
}

impl Responder for HostResponder {
    fn start_response(
        &mut self,
        status: StatusCode,
        headers: HeaderMap,
        exc_info: Option<ExcInfo>,
    ) -> Result<(), GatewayError> {
        match exc_info {
            Some(exc) if !self.output.is_empty() => return Err(GatewayError::Application(exc)),
            Some(_) => {}
            None if self.head.is_some() => return Err(GatewayError::ResponseAlreadyStarted),
            None => {}
        }
        self.head = Some((status, headers));
        Ok(())
    }

    fn write(&mut self, data: Bytes) -> Result<(), GatewayError> {
        if self.head.is_none() {
            return Err(GatewayError::ResponseNotStarted);
        }
        self.output.push(data);
        Ok(())
    }
}
