//! Job outbox for [`SqliteStore`].
//!
//! Dispatching writes a `queued` row; the unique `(run_id, step_id,
//! job_type)` constraint makes a repeated dispatch a no-op. The job runtime
//! drains the outbox and reports completion through [`SqliteStore::finish_job`],
//! which also records the step `done`.

use chrono::Utc;
use rusqlite::{Row, params};
use tracing::{debug, info};

use flowstate_core::{Job, JobStatus, StepStatus};

use crate::error::{Result, StorageError, require_ids};
use crate::sqlite::states::UPSERT_STATE;
use crate::sqlite::store::{SqliteStore, classify, format_datetime, parse_datetime, parse_enum};
use crate::traits::{DispatchOutcome, JobDispatcher, JobRecord};

const JOB_COLUMNS: &str = "run_id, step_id, job_type, status, created_at, finished_at";

struct RawJob {
    run_id: String,
    step_id: String,
    job_type: String,
    status: String,
    created_at: String,
    finished_at: Option<String>,
}

impl RawJob {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            run_id: row.get(0)?,
            step_id: row.get(1)?,
            job_type: row.get(2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
            finished_at: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<JobRecord> {
        Ok(JobRecord {
            status: parse_enum::<JobStatus>("jobs.status", &self.status)?,
            created_at: parse_datetime("jobs.created_at", &self.created_at)?,
            finished_at: self
                .finished_at
                .as_deref()
                .map(|s| parse_datetime("jobs.finished_at", s))
                .transpose()?,
            job: Job::new(self.job_type, self.step_id, self.run_id),
        })
    }
}

impl JobDispatcher for SqliteStore {
    fn dispatch(&self, job: &Job) -> Result<DispatchOutcome> {
        let conn = self.lock_conn()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO jobs (run_id, step_id, job_type, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    job.run_id,
                    job.step_id,
                    job.job_type,
                    JobStatus::Queued.as_str(),
                    format_datetime(&Utc::now())
                ],
            )
            .map_err(classify)?;

        if inserted == 0 {
            debug!(run_id = %job.run_id, step_id = %job.step_id, job_type = %job.job_type, "job already dispatched");
            Ok(DispatchOutcome::Duplicate)
        } else {
            info!(run_id = %job.run_id, step_id = %job.step_id, job_type = %job.job_type, "job enqueued");
            Ok(DispatchOutcome::Enqueued)
        }
    }
}

impl SqliteStore {
    /// Outbox contents in dispatch order, optionally for a single run.
    pub fn list_jobs(&self, run_id: Option<&str>) -> Result<Vec<JobRecord>> {
        let conn = self.lock_conn()?;
        let raw = match run_id {
            Some(run) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {JOB_COLUMNS} FROM jobs WHERE run_id = ?1 ORDER BY id"
                ))?;
                stmt.query_map(params![run], RawJob::from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id"))?;
                stmt.query_map([], RawJob::from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        raw.into_iter().map(RawJob::into_record).collect()
    }

    /// Completion report for a dispatched job: records the step `done` and
    /// marks its queued jobs finished in one transaction. Returns how many
    /// jobs changed; reporting twice is harmless.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] if no job was ever dispatched for the
    /// step. Nothing is written in that case.
    pub fn finish_job(&self, run_id: &str, step_id: &str) -> Result<usize> {
        require_ids("job", run_id, step_id)?;
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction().map_err(classify)?;

        let dispatched: i64 = tx.query_row(
            "SELECT COUNT(*) FROM jobs WHERE run_id = ?1 AND step_id = ?2",
            params![run_id, step_id],
            |row| row.get(0),
        )?;
        if dispatched == 0 {
            return Err(StorageError::not_found("job", format!("{run_id}/{step_id}")));
        }

        let now = format_datetime(&Utc::now());
        tx.execute(
            UPSERT_STATE,
            params![run_id, step_id, StepStatus::Done.as_str(), now],
        )
        .map_err(classify)?;
        let changed = tx
            .execute(
                "UPDATE jobs SET status = ?1, finished_at = ?2
                 WHERE run_id = ?3 AND step_id = ?4 AND status = ?5",
                params![
                    JobStatus::Finished.as_str(),
                    now,
                    run_id,
                    step_id,
                    JobStatus::Queued.as_str()
                ],
            )
            .map_err(classify)?;
        tx.commit()
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        debug!(run_id, step_id, changed, "finished jobs");
        Ok(changed)
    }
}
