use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::storage::{expiry_from_now, is_expired, SessionSlot};

pub const KEYRING_SERVICE: &str = "com.studyhub.session";

/// What the keychain entry actually holds: the keychain has no expiry of its own.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSecret {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Slot kept in the OS keychain (encrypted at rest by the platform).
#[derive(Debug, Clone)]
pub struct KeychainSlot {
    service: String,
    name: String,
}

impl KeychainSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_service(KEYRING_SERVICE, name)
    }

    pub fn with_service(service: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            name: name.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, SessionError> {
        Ok(keyring::Entry::new(&self.service, &self.name)?)
    }
}

impl SessionSlot for KeychainSlot {
    fn read(&self) -> Result<Option<String>, SessionError> {
        let entry = self.entry()?;
        let raw = match entry.get_password() {
            Ok(raw) => raw,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredSecret = serde_json::from_str(&raw)?;
        if is_expired(stored.expires_at) {
            let _ = entry.delete_credential();
            return Ok(None);
        }
        Ok(Some(stored.value))
    }

    fn write(&self, value: &str, max_age: Duration) -> Result<(), SessionError> {
        let stored = StoredSecret {
            value: value.to_string(),
            expires_at: expiry_from_now(max_age)?,
        };
        self.entry()?
            .set_password(&serde_json::to_string(&stored)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
