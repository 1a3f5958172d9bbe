//! Durable slot port and its implementations.
//!
//! The session store only ever sees `SessionSlot`; which backend holds the
//! serialized profile (a browser-style cookie, a SQLite row, or the OS
//! keychain) is decided by whoever builds the store.

pub mod cookie;
pub mod keychain;
pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Duration, Utc};

use crate::error::SessionError;

pub use cookie::{CookieJar, CookieSlot, SessionCookie};
pub use keychain::KeychainSlot;
pub use memory::MemorySlot;
pub use sqlite::SqliteSlot;

/// A single named key-value slot that survives reloads and expires on its own.
pub trait SessionSlot: Send + Sync {
    /// Current value, or `None` when absent or expired.
    fn read(&self) -> Result<Option<String>, SessionError>;

    /// Store `value`, replacing any previous one, expiring after `max_age`.
    fn write(&self, value: &str, max_age: Duration) -> Result<(), SessionError>;

    /// Remove the value. Clearing an empty slot is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Absolute expiry for a slot written now.
pub(crate) fn expiry_from_now(max_age: Duration) -> Result<DateTime<Utc>, SessionError> {
    Utc::now()
        .checked_add_signed(max_age)
        .ok_or_else(|| SessionError::InvalidLifetime(format!("{max_age} overflows the clock")))
}

pub(crate) fn is_expired(expires_at: DateTime<Utc>) -> bool {
    Utc::now() >= expires_at
}
