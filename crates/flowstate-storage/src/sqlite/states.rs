//! Step state persistence for [`SqliteStore`].

use std::collections::BTreeSet;

use chrono::Utc;
use rusqlite::params;
use tracing::debug;

use flowstate_core::{StepState, StepStatus};

use crate::error::{Result, StorageError, require_ids};
use crate::sqlite::store::{SqliteStore, classify, format_datetime, parse_enum};
use crate::traits::StateStore;

/// Updates an existing row unless it is already `done`, so a stale
/// evaluation racing a completion report cannot demote the step.
pub(crate) const UPSERT_STATE: &str = "INSERT INTO step_states (run_id, step_id, status, updated_at)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (run_id, step_id) DO UPDATE
        SET status = excluded.status, updated_at = excluded.updated_at
      WHERE step_states.status <> 'done' AND step_states.status <> excluded.status";

impl StateStore for SqliteStore {
    fn states_for_run(&self, run_id: &str) -> Result<Vec<StepState>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT step_id, status FROM step_states WHERE run_id = ?1 ORDER BY step_id",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut states = Vec::new();
        for row in rows {
            let (step_id, status) = row?;
            let status: StepStatus = parse_enum("step_states.status", &status)?;
            states.push(StepState::new(run_id, step_id, status));
        }
        Ok(states)
    }

    fn upsert_states(&self, states: &[StepState]) -> Result<()> {
        if states.is_empty() {
            return Ok(());
        }
        for state in states {
            require_ids("step state", &state.run_id, &state.step_id)?;
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction().map_err(classify)?;
        let now = format_datetime(&Utc::now());
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare_cached(UPSERT_STATE)?;
            for state in states {
                written += stmt
                    .execute(params![state.run_id, state.step_id, state.status.as_str(), now])
                    .map_err(classify)?;
            }
        }
        tx.commit()
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        debug!(received = states.len(), written, "upserted step states");
        Ok(())
    }

    fn runs(&self) -> Result<Vec<String>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT run_id FROM step_states UNION SELECT run_id FROM available_inputs",
        )?;
        let runs = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;
        Ok(runs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn upsert_and_read_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .upsert_states(&[
                StepState::new("r1", "b", StepStatus::Blocked),
                StepState::new("r1", "a", StepStatus::Ready),
                StepState::new("r2", "a", StepStatus::Blocked),
            ])
            .unwrap();
        assert_eq!(
            store.states_for_run("r1").unwrap(),
            vec![
                StepState::new("r1", "a", StepStatus::Ready),
                StepState::new("r1", "b", StepStatus::Blocked),
            ]
        );
    }

    #[test]
    fn done_is_never_overwritten() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_states(&[StepState::done("r1", "a")]).unwrap();
        store
            .upsert_states(&[StepState::new("r1", "a", StepStatus::Ready)])
            .unwrap();
        store
            .upsert_states(&[StepState::new("r1", "a", StepStatus::Blocked)])
            .unwrap();
        assert_eq!(store.states_for_run("r1").unwrap(), vec![StepState::done("r1", "a")]);
    }

    #[test]
    fn lower_statuses_can_move() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .upsert_states(&[StepState::new("r1", "a", StepStatus::Ready)])
            .unwrap();
        store
            .upsert_states(&[StepState::new("r1", "a", StepStatus::Blocked)])
            .unwrap();
        assert_eq!(
            store.states_for_run("r1").unwrap(),
            vec![StepState::new("r1", "a", StepStatus::Blocked)]
        );
    }

    #[test]
    fn empty_ids_are_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .upsert_states(&[StepState::done("", "a")])
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation { .. }));
    }

    #[test]
    fn corrupt_status_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        {
            let conn = store.lock_conn().unwrap();
            conn.execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 INSERT INTO step_states VALUES ('r1', 'a', 'finished', '2026-01-01T00:00:00.000Z');",
            )
            .unwrap();
        }
        let err = store.states_for_run("r1").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
