use serde::Serialize;
use studyhub_session::SessionError;
use studyhub_shared::error::PortalError;

/// User-facing error returned by portal commands. `message` is shown inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppError {
    pub message: String,
}

impl AppError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

impl From<PortalError> for AppError {
    fn from(e: PortalError) -> Self {
        Self::new(e.to_string())
    }
}

/// Classify a transport failure without leaking URLs or internals.
pub(crate) fn network_error(e: &reqwest::Error) -> PortalError {
    let message = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "could not connect to server"
    } else if e.is_decode() {
        "unexpected response from server"
    } else {
        "network request failed"
    };
    PortalError::Network(message.to_string())
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        network_error(&e).into()
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        PortalError::from(e).into()
    }
}
