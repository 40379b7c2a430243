//! Job planning: which automated steps should be dispatched now.

use std::collections::HashMap;

use tracing::debug;

use flowstate_core::{Job, StepState, StepStatus};
use flowstate_definition::FlowDefinition;

/// Return one job per `(run, step)` whose resolved status is `ready` and
/// whose step declares an automation.
///
/// Conflicting records for the same `(run, step)` resolve by precedence
/// (`done > ready > blocked`) before filtering, so a step reported both
/// `ready` and `done` is never planned. Records for steps the definition
/// does not know are skipped.
///
/// Jobs are ordered by the step's topological rank, then by the order in
/// which each run first appears in `states`.
pub fn plan_jobs(definition: &FlowDefinition, states: &[StepState]) -> Vec<Job> {
    let mut runs: Vec<&str> = Vec::new();
    let mut run_index: HashMap<&str, usize> = HashMap::new();
    let mut resolved: HashMap<(usize, usize), StepStatus> = HashMap::new();
    let mut unknown = 0usize;

    for state in states {
        let Some(rank) = definition.rank(&state.step_id) else {
            unknown += 1;
            continue;
        };
        let run = *run_index.entry(state.run_id.as_str()).or_insert_with(|| {
            runs.push(state.run_id.as_str());
            runs.len() - 1
        });
        resolved
            .entry((rank, run))
            .and_modify(|s| *s = s.merge(state.status))
            .or_insert(state.status);
    }

    if unknown > 0 {
        debug!(unknown, "skipped states for steps not in the definition");
    }

    let mut candidates: Vec<(usize, usize)> = resolved
        .into_iter()
        .filter(|(_, status)| status.is_ready())
        .map(|(key, _)| key)
        .collect();
    candidates.sort_unstable();

    let order = definition.topological_positions();
    let jobs: Vec<Job> = candidates
        .into_iter()
        .filter_map(|(rank, run)| {
            let step = definition.step_at(order[rank]);
            step.job_type()
                .map(|job_type| Job::new(job_type, step.id.as_str(), runs[run]))
        })
        .collect();

    debug!(jobs = jobs.len(), runs = runs.len(), "planned jobs");
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_definition::{FlowFile, StepDef, resolve};
    use pretty_assertions::assert_eq;

    fn definition() -> FlowDefinition {
        resolve(
            &FlowFile::new("billing")
                .with_step(StepDef::new("intake"))
                .with_step(StepDef::new("invoice").needs(["intake"]).automated("send_invoice"))
                .with_step(StepDef::new("review").needs(["intake"]))
                .with_step(StepDef::new("archive").needs(["invoice", "review"]).automated("archive")),
        )
        .unwrap()
    }

    #[test]
    fn plans_only_ready_automated_steps() {
        let states = [
            StepState::done("r1", "intake"),
            StepState::new("r1", "invoice", StepStatus::Ready),
            StepState::new("r1", "review", StepStatus::Ready),
            StepState::new("r1", "archive", StepStatus::Blocked),
        ];
        assert_eq!(
            plan_jobs(&definition(), &states),
            vec![Job::new("send_invoice", "invoice", "r1")]
        );
    }

    #[test]
    fn done_wins_over_ready_in_either_order() {
        let def = definition();
        let a = [
            StepState::new("r1", "invoice", StepStatus::Ready),
            StepState::done("r1", "invoice"),
        ];
        let b = [
            StepState::done("r1", "invoice"),
            StepState::new("r1", "invoice", StepStatus::Ready),
        ];
        assert!(plan_jobs(&def, &a).is_empty());
        assert!(plan_jobs(&def, &b).is_empty());
    }

    #[test]
    fn duplicate_ready_records_plan_one_job() {
        let states = [
            StepState::new("r1", "invoice", StepStatus::Ready),
            StepState::new("r1", "invoice", StepStatus::Ready),
            StepState::new("r1", "invoice", StepStatus::Blocked),
        ];
        assert_eq!(plan_jobs(&definition(), &states).len(), 1);
    }

    #[test]
    fn orders_by_rank_then_first_seen_run() {
        let states = [
            StepState::new("r2", "archive", StepStatus::Ready),
            StepState::new("r1", "archive", StepStatus::Ready),
            StepState::new("r1", "invoice", StepStatus::Ready),
        ];
        assert_eq!(
            plan_jobs(&definition(), &states),
            vec![
                Job::new("send_invoice", "invoice", "r1"),
                Job::new("archive", "archive", "r2"),
                Job::new("archive", "archive", "r1"),
            ]
        );
    }

    #[test]
    fn unknown_steps_and_empty_input_plan_nothing() {
        let def = definition();
        assert!(plan_jobs(&def, &[]).is_empty());
        let states = [StepState::new("r1", "ghost", StepStatus::Ready)];
        assert!(plan_jobs(&def, &states).is_empty());
    }
}
