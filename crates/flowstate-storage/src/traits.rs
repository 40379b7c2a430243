//! Collaborator traits the reconcile cycle is driven through.
//!
//! Consumers depend on these traits rather than on concrete stores so that
//! the durable runtime of the host application can stand in for them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use flowstate_core::{AvailableInput, Job, JobStatus, StepState};

use crate::error::Result;

/// What a dispatcher did with a job handed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchOutcome {
    /// The job was accepted for execution.
    Enqueued,
    /// A job with the same `(run, step, type)` was already accepted.
    Duplicate,
}

/// A dispatched job as kept by a dispatcher's outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    #[serde(flatten)]
    pub job: Job,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Persisted step states keyed by `(run, step)`.
pub trait StateStore: Send + Sync {
    /// Every recorded state of a run. Order is unspecified.
    fn states_for_run(&self, run_id: &str) -> Result<Vec<StepState>>;

    /// Insert or update states. A persisted `done` is never replaced by a
    /// lower status.
    fn upsert_states(&self, states: &[StepState]) -> Result<()>;

    /// Ids of every run with recorded state or evidence, sorted.
    fn runs(&self) -> Result<Vec<String>>;
}

/// Out-of-band evidence that a step's deliverable exists.
pub trait EvidenceStore: Send + Sync {
    fn inputs_for_run(&self, run_id: &str) -> Result<Vec<AvailableInput>>;

    fn has_input(&self, run_id: &str, step_id: &str) -> Result<bool>;

    /// Record evidence. Re-recording the same `(run, step)` keeps one entry;
    /// a non-empty reference replaces the previous one.
    fn record_input(&self, input: &AvailableInput) -> Result<()>;
}

/// Hands planned jobs to the execution runtime.
///
/// Implementations dedupe on [`Job::dedupe_key`] so re-planning the same
/// ready step (for example after a crash between dispatch and the state
/// update) does not execute it twice.
pub trait JobDispatcher: Send + Sync {
    fn dispatch(&self, job: &Job) -> Result<DispatchOutcome>;
}
