//! DDL statements for the SQLite schema.
//!
//! Timestamps are stored as TEXT in ISO 8601 format. Statuses are stored as
//! their lowercase names.

/// Current schema version. Bumped whenever DDL changes.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Core DDL statements executed during `init_schema`.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS step_states (
        run_id      TEXT NOT NULL,
        step_id     TEXT NOT NULL,
        status      TEXT NOT NULL CHECK (status IN ('blocked', 'ready', 'done')),
        updated_at  TEXT NOT NULL,
        PRIMARY KEY (run_id, step_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS available_inputs (
        run_id       TEXT NOT NULL,
        step_id      TEXT NOT NULL,
        reference    TEXT NOT NULL DEFAULT '',
        recorded_at  TEXT NOT NULL,
        PRIMARY KEY (run_id, step_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        run_id       TEXT NOT NULL,
        step_id      TEXT NOT NULL,
        job_type     TEXT NOT NULL,
        status       TEXT NOT NULL DEFAULT 'queued',
        created_at   TEXT NOT NULL,
        finished_at  TEXT,
        UNIQUE (run_id, step_id, job_type)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_run ON jobs(run_id)",
    "CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status)",
    r#"
    CREATE TABLE IF NOT EXISTS config (
        key    TEXT PRIMARY KEY,
        value  TEXT NOT NULL
    )
    "#,
];
