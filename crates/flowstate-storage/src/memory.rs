//! [`MemoryStore`]: all three collaborators behind one mutex.
//!
//! Used by tests and by hosts that keep run state elsewhere and only need
//! the reconcile cycle.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use flowstate_core::{AvailableInput, Job, JobStatus, StepState, StepStatus};

use crate::error::{Result, StorageError, require_ids};
use crate::traits::{DispatchOutcome, EvidenceStore, JobDispatcher, JobRecord, StateStore};

#[derive(Debug, Default)]
struct Inner {
    states: BTreeMap<(String, String), StepStatus>,
    inputs: BTreeMap<(String, String), String>,
    jobs: Vec<JobRecord>,
    job_keys: HashSet<(String, String, String)>,
}

/// In-memory implementation of [`StateStore`], [`EvidenceStore`] and
/// [`JobDispatcher`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Connection(format!("mutex poisoned: {e}")))
    }

    /// Dispatched jobs in dispatch order, optionally for one run.
    pub fn jobs(&self, run_id: Option<&str>) -> Result<Vec<JobRecord>> {
        let inner = self.lock()?;
        Ok(inner
            .jobs
            .iter()
            .filter(|r| run_id.is_none_or(|run| r.job.run_id == run))
            .cloned()
            .collect())
    }

    /// Completion report for a dispatched job: records the step `done` and
    /// marks its queued jobs finished. Returns how many jobs changed.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] if no job was ever dispatched for the
    /// step.
    pub fn finish_job(&self, run_id: &str, step_id: &str) -> Result<usize> {
        require_ids("job", run_id, step_id)?;
        let mut inner = self.lock()?;
        if !inner
            .jobs
            .iter()
            .any(|r| r.job.run_id == run_id && r.job.step_id == step_id)
        {
            return Err(StorageError::not_found("job", format!("{run_id}/{step_id}")));
        }

        inner
            .states
            .insert((run_id.to_string(), step_id.to_string()), StepStatus::Done);
        let now = Utc::now();
        let mut changed = 0;
        for record in inner.jobs.iter_mut().filter(|r| {
            r.job.run_id == run_id && r.job.step_id == step_id && r.status == JobStatus::Queued
        }) {
            record.status = JobStatus::Finished;
            record.finished_at = Some(now);
            changed += 1;
        }
        Ok(changed)
    }
}

impl StateStore for MemoryStore {
    fn states_for_run(&self, run_id: &str) -> Result<Vec<StepState>> {
        let inner = self.lock()?;
        Ok(inner
            .states
            .iter()
            .filter(|((run, _), _)| run == run_id)
            .map(|((run, step), status)| StepState::new(run.as_str(), step.as_str(), *status))
            .collect())
    }

    fn upsert_states(&self, states: &[StepState]) -> Result<()> {
        for state in states {
            require_ids("step state", &state.run_id, &state.step_id)?;
        }
        let mut inner = self.lock()?;
        for state in states {
            let key = (state.run_id.clone(), state.step_id.clone());
            let slot = inner.states.entry(key).or_insert(state.status);
            if !slot.is_done() {
                *slot = state.status;
            }
        }
        Ok(())
    }

    fn runs(&self) -> Result<Vec<String>> {
        let inner = self.lock()?;
        let runs: BTreeSet<&String> = inner
            .states
            .keys()
            .chain(inner.inputs.keys())
            .map(|(run, _)| run)
            .collect();
        Ok(runs.into_iter().cloned().collect())
    }
}

impl EvidenceStore for MemoryStore {
    fn inputs_for_run(&self, run_id: &str) -> Result<Vec<AvailableInput>> {
        let inner = self.lock()?;
        Ok(inner
            .inputs
            .iter()
            .filter(|((run, _), _)| run == run_id)
            .map(|((run, step), reference)| {
                AvailableInput::new(run.as_str(), step.as_str()).with_reference(reference.as_str())
            })
            .collect())
    }

    fn has_input(&self, run_id: &str, step_id: &str) -> Result<bool> {
        let inner = self.lock()?;
        Ok(inner
            .inputs
            .contains_key(&(run_id.to_string(), step_id.to_string())))
    }

    fn record_input(&self, input: &AvailableInput) -> Result<()> {
        require_ids("available input", &input.run_id, &input.step_id)?;
        let mut inner = self.lock()?;
        let slot = inner
            .inputs
            .entry((input.run_id.clone(), input.step_id.clone()))
            .or_default();
        if !input.reference.is_empty() {
            *slot = input.reference.clone();
        }
        Ok(())
    }
}

impl JobDispatcher for MemoryStore {
    fn dispatch(&self, job: &Job) -> Result<DispatchOutcome> {
        let mut inner = self.lock()?;
        let (run, step, job_type) = job.dedupe_key();
        let key = (run.to_string(), step.to_string(), job_type.to_string());
        if !inner.job_keys.insert(key) {
            return Ok(DispatchOutcome::Duplicate);
        }
        inner.jobs.push(JobRecord {
            job: job.clone(),
            status: JobStatus::Queued,
            created_at: Utc::now(),
            finished_at: None,
        });
        Ok(DispatchOutcome::Enqueued)
    }
}
