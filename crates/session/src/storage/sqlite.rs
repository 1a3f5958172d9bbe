use std::path::Path;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::error::SessionError;
use crate::storage::{expiry_from_now, SessionSlot};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS session_slots (
    name TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);";

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;",
    )?;
    conn.execute_batch(SCHEMA)
}

/// Slot stored as one row of a local SQLite database (native-app targets).
pub struct SqliteSlot {
    conn: Mutex<Connection>,
    name: String,
}

impl SqliteSlot {
    pub fn open(path: &Path, name: impl Into<String>) -> Result<Self, SessionError> {
        let conn = Connection::open(path)
            .map_err(|e| SessionError::Storage(format!("failed to open session DB: {e}")))?;
        Self::from_connection(conn, name)
    }

    pub fn open_in_memory(name: impl Into<String>) -> Result<Self, SessionError> {
        Self::from_connection(Connection::open_in_memory()?, name)
    }

    pub fn from_connection(conn: Connection, name: impl Into<String>) -> Result<Self, SessionError> {
        configure_connection(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            name: name.into(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SessionError> {
        self.conn
            .lock()
            .map_err(|e| SessionError::Storage(format!("session DB lock poisoned: {e}")))
    }
}

impl SessionSlot for SqliteSlot {
    fn read(&self) -> Result<Option<String>, SessionError> {
        let conn = self.lock()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM session_slots WHERE name = ?1",
                rusqlite::params![&self.name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((_, expires_at)) if expires_at <= Utc::now().timestamp() => {
                conn.execute(
                    "DELETE FROM session_slots WHERE name = ?1",
                    rusqlite::params![&self.name],
                )?;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    fn write(&self, value: &str, max_age: Duration) -> Result<(), SessionError> {
        let expires_at = expiry_from_now(max_age)?.timestamp();
        self.lock()?.execute(
            "INSERT INTO session_slots (name, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                 value = excluded.value,
                 expires_at = excluded.expires_at",
            rusqlite::params![&self.name, value, expires_at],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.lock()?.execute(
            "DELETE FROM session_slots WHERE name = ?1",
            rusqlite::params![&self.name],
        )?;
        Ok(())
    }
}
