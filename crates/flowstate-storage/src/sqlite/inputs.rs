//! Available-input evidence for [`SqliteStore`].

use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use flowstate_core::AvailableInput;

use crate::error::{Result, require_ids};
use crate::sqlite::store::{SqliteStore, classify, format_datetime};
use crate::traits::EvidenceStore;

impl EvidenceStore for SqliteStore {
    fn inputs_for_run(&self, run_id: &str) -> Result<Vec<AvailableInput>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT step_id, reference FROM available_inputs WHERE run_id = ?1 ORDER BY step_id",
        )?;
        let inputs = stmt
            .query_map(params![run_id], |row| {
                Ok(AvailableInput::new(run_id, row.get::<_, String>(0)?)
                    .with_reference(row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(inputs)
    }

    fn has_input(&self, run_id: &str, step_id: &str) -> Result<bool> {
        let conn = self.lock_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM available_inputs WHERE run_id = ?1 AND step_id = ?2",
                params![run_id, step_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn record_input(&self, input: &AvailableInput) -> Result<()> {
        require_ids("available input", &input.run_id, &input.step_id)?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO available_inputs (run_id, step_id, reference, recorded_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (run_id, step_id) DO UPDATE SET reference = excluded.reference
              WHERE excluded.reference <> ''",
            params![
                input.run_id,
                input.step_id,
                input.reference,
                format_datetime(&Utc::now())
            ],
        )
        .map_err(classify)?;
        debug!(run_id = %input.run_id, step_id = %input.step_id, "recorded available input");
        Ok(())
    }
}
