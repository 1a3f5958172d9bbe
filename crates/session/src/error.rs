//! Error types for the studyhub-session crate.

use thiserror::Error;

/// Errors raised by the session store and its durable slots.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A patch was applied while nobody is signed in.
    #[error("no active session")]
    NotAuthenticated,

    /// Durable slot I/O failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Profile (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// OS keychain operation failed.
    #[error("keychain error: {0}")]
    Keychain(String),

    /// OS keychain is not available on this platform.
    #[error("keychain unavailable")]
    KeychainUnavailable,

    /// Slot lifetime cannot be represented.
    #[error("invalid slot lifetime: {0}")]
    InvalidLifetime(String),
}

impl From<rusqlite::Error> for SessionError {
    fn from(err: rusqlite::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

impl From<keyring::Error> for SessionError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_) => {
                SessionError::KeychainUnavailable
            }
            other => SessionError::Keychain(other.to_string()),
        }
    }
}

impl From<SessionError> for studyhub_shared::error::PortalError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotAuthenticated => studyhub_shared::error::PortalError::Unauthorized,
            other => studyhub_shared::error::PortalError::Storage(other.to_string()),
        }
    }
}
