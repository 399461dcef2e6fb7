//! Deferred response starter.
//!
//! # Responsibilities
//! - Record the application's status and headers without committing them
//! - Commit on the first direct write so early output stays in order
//! - Forward correcting calls (exception info, repeated starts) unchanged
//!
//! # Design Decisions
//! - Explicit three-state machine: NotStarted → Pending → Committed
//! - A correction may jump straight to Committed
//! - An ordinary start after Committed is a contract violation

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

use crate::gateway::{ExcInfo, GatewayError, Responder};

/// Where a captured response stands.
#[derive(Debug)]
pub enum CaptureState {
    /// `start_response` has not been called.
    NotStarted,
    /// Status and headers recorded, nothing sent downstream yet.
    Pending { status: StatusCode, headers: HeaderMap },
    /// Downstream starter already invoked; the filter can no longer intervene.
    Committed,
}

/// Response starter handed to the wrapped application in place of the real one.
pub struct ResponseCapture<'a> {
    downstream: &'a mut dyn Responder,
    state: CaptureState,
}

impl<'a> ResponseCapture<'a> {
    pub fn new(downstream: &'a mut dyn Responder) -> Self {
        Self {
            downstream,
            state: CaptureState::NotStarted,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Release the downstream starter and report the final state.
    pub fn finish(self) -> CaptureState {
        self.state
    }

    fn commit_pending(&mut self, status: StatusCode, headers: HeaderMap) -> Result<(), GatewayError> {
        tracing::trace!(%status, "Committing captured response");
        self.downstream.start_response(status, headers, None)
    }
}

impl Responder for ResponseCapture<'_> {
    fn start_response(
        &mut self,
        status: StatusCode,
        headers: HeaderMap,
        exc_info: Option<ExcInfo>,
    ) -> Result<(), GatewayError> {
        match (std::mem::replace(&mut self.state, CaptureState::Committed), exc_info) {
            (CaptureState::NotStarted, None) => {
                self.state = CaptureState::Pending { status, headers };
                Ok(())
            }
            (CaptureState::Committed, None) => Err(GatewayError::ResponseAlreadyStarted),
            (CaptureState::Pending { status: first_status, headers: first_headers }, exc_info) => {
                // Called once already: pass that call on up before this one.
                self.commit_pending(first_status, first_headers)?;
                self.downstream.start_response(status, headers, exc_info)
            }
            (_, exc_info) => self.downstream.start_response(status, headers, exc_info),
        }
    }

    fn write(&mut self, data: Bytes) -> Result<(), GatewayError> {
        match std::mem::replace(&mut self.state, CaptureState::Committed) {
            CaptureState::NotStarted => {
                self.state = CaptureState::NotStarted;
                Err(GatewayError::ResponseNotStarted)
            }
            CaptureState::Pending { status, headers } => {
                self.commit_pending(status, headers)?;
                self.downstream.write(data)
            }
            CaptureState::Committed => self.downstream.write(data),
        }
    }
}
