//! Gateway error definitions.

use std::sync::Arc;
use thiserror::Error;

/// Exception info an application hands to `start_response` when it replaces
/// a response because of an error.
pub type ExcInfo = Arc<dyn std::error::Error + Send + Sync>;

/// Errors raised while running an application through the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// `start_response` was called again for an ordinary response after
    /// headers were already committed.
    #[error("start_response called a second time without exception info")]
    ResponseAlreadyStarted,

    /// The application wrote body bytes before declaring a status.
    #[error("write called before start_response")]
    ResponseNotStarted,

    /// The application returned without ever calling `start_response`.
    #[error("application returned without calling start_response")]
    StartResponseNeverCalled,

    /// Error raised by the application itself.
    #[error("application error: {0}")]
    Application(ExcInfo),

    /// I/O failure while opening or reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Wrap any error as an application error.
    pub fn application<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GatewayError::Application(Arc::new(err))
    }
}
