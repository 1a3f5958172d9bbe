use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::error::SessionError;
use crate::storage::{expiry_from_now, is_expired, SessionSlot};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local slot. Does not survive a restart; used for tests and
/// targets that have no durable storage.
#[derive(Debug, Default)]
pub struct MemorySlot {
    entry: Mutex<Option<Entry>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with `value`, as if written by an earlier run.
    pub fn with_value(value: impl Into<String>, max_age: Duration) -> Result<Self, SessionError> {
        let slot = Self::new();
        slot.write(&value.into(), max_age)?;
        Ok(slot)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Entry>> {
        self.entry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, SessionError> {
        let mut entry = self.lock();
        if entry.as_ref().is_some_and(|e| is_expired(e.expires_at)) {
            *entry = None;
        }
        Ok(entry.as_ref().map(|e| e.value.clone()))
    }

    fn write(&self, value: &str, max_age: Duration) -> Result<(), SessionError> {
        let expires_at = expiry_from_now(max_age)?;
        *self.lock() = Some(Entry {
            value: value.to_string(),
            expires_at,
        });
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.lock() = None;
        Ok(())
    }
}
