//! [`SqliteStore`]: SQLite-backed collaborators.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode};
use tracing::{debug, info};

use flowstate_core::ParseEnumError;

use crate::error::{Result, StorageError};
use crate::sqlite::schema;

/// SQLite-backed implementation of [`StateStore`](crate::traits::StateStore),
/// [`EvidenceStore`](crate::traits::EvidenceStore) and
/// [`JobDispatcher`](crate::traits::JobDispatcher).
///
/// Wraps a [`rusqlite::Connection`] in a `Mutex`. Every public method
/// acquires the lock, executes SQL, and releases it.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database at `path`, enables WAL, and initialises
    /// the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(?path, "opening SQLite database");

        let conn = Connection::open(path).map_err(|e| {
            StorageError::Connection(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        debug!("opening in-memory SQLite database");
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("failed to open in-memory db: {e}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.init_schema()?;
        Ok(store)
    }

    fn configure_connection(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| StorageError::Connection(format!("failed to set pragmas: {e}")))?;
        Ok(())
    }

    /// Creates all tables and indexes if they do not exist and stamps the
    /// schema version.
    pub(crate) fn init_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let version: std::result::Result<String, _> = conn.query_row(
            "SELECT value FROM config WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        );
        if let Ok(v) = version {
            if v.parse::<i32>().is_ok_and(|v| v >= schema::CURRENT_SCHEMA_VERSION) {
                debug!(version = %v, "schema already at current version");
                return Ok(());
            }
        }

        for stmt in schema::SCHEMA_STATEMENTS {
            conn.execute_batch(stmt).map_err(|e| StorageError::Migration {
                name: "init_schema".into(),
                reason: format!("{e}\nStatement: {}", truncate(stmt.trim(), 120)),
            })?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES ('schema_version', ?1)",
            rusqlite::params![schema::CURRENT_SCHEMA_VERSION.to_string()],
        )
        .map_err(|e| StorageError::Migration {
            name: "schema_version".into(),
            reason: e.to_string(),
        })?;

        info!("schema initialized (version {})", schema::CURRENT_SCHEMA_VERSION);
        Ok(())
    }

    /// Acquires the connection lock.
    pub(crate) fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Connection(format!("mutex poisoned: {e}")))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

/// Formats a timestamp as ISO 8601 TEXT.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses a timestamp written by [`format_datetime`].
pub(crate) fn parse_datetime(column: &str, s: &str) -> Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>().map_err(|e| StorageError::Corrupt {
        column: column.to_string(),
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a closed-enum column such as a status.
pub(crate) fn parse_enum<T>(column: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    value.parse().map_err(|e: ParseEnumError| StorageError::Corrupt {
        column: column.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Maps busy/locked failures to [`StorageError::DatabaseLocked`].
pub(crate) fn classify(err: rusqlite::Error) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
        {
            StorageError::DatabaseLocked(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => StorageError::Query(err),
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
