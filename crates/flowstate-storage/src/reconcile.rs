//! One reconciliation cycle for a run.

use serde::Serialize;
use tracing::info;

use flowstate_core::{Job, StepState};
use flowstate_definition::FlowDefinition;
use flowstate_engine::{Evaluation, evaluate_flow, plan_jobs};

use crate::error::Result;
use crate::traits::{DispatchOutcome, EvidenceStore, JobDispatcher, StateStore};

/// What a reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub run_id: String,
    pub evaluation: Evaluation,
    /// States written because they differed from what was persisted.
    pub changed: Vec<StepState>,
    /// Jobs the planner produced, in planning order.
    pub jobs: Vec<Job>,
    pub enqueued: usize,
    pub duplicates: usize,
}

/// Read a run's state and evidence, evaluate it, persist the states that
/// changed, plan jobs, and dispatch them.
///
/// Safe to repeat at any time: evaluation is idempotent, only deltas are
/// written, and dispatchers dedupe jobs, so a cycle interrupted between any
/// two steps converges when re-run.
///
/// # Errors
///
/// Propagates the first collaborator failure. Jobs dispatched before the
/// failure stay dispatched.
pub fn reconcile_run<S, E, D>(
    definition: &FlowDefinition,
    run_id: &str,
    states: &S,
    evidence: &E,
    dispatcher: &D,
) -> Result<ReconcileReport>
where
    S: StateStore + ?Sized,
    E: EvidenceStore + ?Sized,
    D: JobDispatcher + ?Sized,
{
    let persisted = states.states_for_run(run_id)?;
    let inputs = evidence.inputs_for_run(run_id)?;

    let evaluation = evaluate_flow(definition, run_id, &persisted, &inputs);
    let changed = evaluation.changed_from(&persisted);
    states.upsert_states(&changed)?;

    let jobs = plan_jobs(definition, &evaluation.states);
    let mut enqueued = 0;
    let mut duplicates = 0;
    for job in &jobs {
        match dispatcher.dispatch(job)? {
            DispatchOutcome::Enqueued => enqueued += 1,
            DispatchOutcome::Duplicate => duplicates += 1,
        }
    }

    info!(
        run_id,
        changed = changed.len(),
        enqueued,
        duplicates,
        complete = evaluation.is_complete(),
        "reconciled run"
    );

    Ok(ReconcileReport {
        run_id: run_id.to_string(),
        evaluation,
        changed,
        jobs,
        enqueued,
        duplicates,
    })
}
