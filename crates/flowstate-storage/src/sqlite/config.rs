//! Key-value settings stored alongside the run data.

use rusqlite::{OptionalExtension, params};

use crate::error::Result;
use crate::sqlite::store::SqliteStore;

/// Key under which the fingerprint of the last reconciled definition is kept.
pub const DEFINITION_FINGERPRINT_KEY: &str = "definition_fingerprint";

impl SqliteStore {
    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Value for `key`, or `None` when unset.
    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}
