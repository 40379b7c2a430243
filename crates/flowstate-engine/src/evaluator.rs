//! Evaluate the status of every step of a run.
//!
//! Steps are visited in the definition's cached topological order, so a
//! step always sees the final status of its dependencies computed in the
//! same pass. Per step, the first matching rule wins:
//!
//! 1. a recorded `done` state: `done` (completion is never revisited)
//! 2. available input for the step: `done`
//! 3. every dependency `done` (vacuously true without dependencies): `ready`
//! 4. otherwise: `blocked`

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use flowstate_core::{AvailableInput, StepState, StepStatus};
use flowstate_definition::FlowDefinition;

/// Result of evaluating one run: one state per definition step, in
/// topological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub run_id: String,
    pub states: Vec<StepState>,
}

/// Number of steps in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub blocked: usize,
    pub ready: usize,
    pub done: usize,
}

/// Compute the status of every step for `run_id`.
///
/// `current_states` and `available_inputs` may contain records for other
/// runs or for steps the definition does not know; those are ignored.
/// Conflicting records for one step are merged by precedence
/// (`done > ready > blocked`), independent of their order.
///
/// This never fails: missing data simply leaves steps `blocked`.
pub fn evaluate_flow(
    definition: &FlowDefinition,
    run_id: &str,
    current_states: &[StepState],
    available_inputs: &[AvailableInput],
) -> Evaluation {
    let n = definition.len();
    let mut ignored = 0usize;

    let mut recorded: Vec<Option<StepStatus>> = vec![None; n];
    for state in current_states {
        if state.run_id != run_id {
            ignored += 1;
            continue;
        }
        match definition.position(&state.step_id) {
            Some(pos) => {
                recorded[pos] = Some(match recorded[pos] {
                    Some(prev) => prev.merge(state.status),
                    None => state.status,
                });
            }
            None => ignored += 1,
        }
    }

    let mut evidence = vec![false; n];
    for input in available_inputs {
        if input.run_id != run_id {
            ignored += 1;
            continue;
        }
        match definition.position(&input.step_id) {
            Some(pos) => evidence[pos] = true,
            None => ignored += 1,
        }
    }

    if ignored > 0 {
        warn!(run_id, ignored, "ignored records for other runs or unknown steps");
    }

    let mut computed = vec![StepStatus::Blocked; n];
    for &pos in definition.topological_positions() {
        computed[pos] = if recorded[pos] == Some(StepStatus::Done) || evidence[pos] {
            StepStatus::Done
        } else if definition
            .dependency_positions(pos)
            .iter()
            .all(|&dep| computed[dep].is_done())
        {
            StepStatus::Ready
        } else {
            StepStatus::Blocked
        };
    }

    let states: Vec<StepState> = definition
        .topological_positions()
        .iter()
        .map(|&pos| StepState::new(run_id, definition.step_at(pos).id.as_str(), computed[pos]))
        .collect();

    let evaluation = Evaluation {
        run_id: run_id.to_string(),
        states,
    };
    let counts = evaluation.counts();
    debug!(
        run_id,
        blocked = counts.blocked,
        ready = counts.ready,
        done = counts.done,
        "evaluated run"
    );
    evaluation
}

impl Evaluation {
    /// Status of a step, or `None` if the definition has no such step.
    pub fn status_of(&self, step_id: &str) -> Option<StepStatus> {
        self.states
            .iter()
            .find(|s| s.step_id == step_id)
            .map(|s| s.status)
    }

    /// Ids of the steps in `status`, in topological order.
    pub fn steps_with(&self, status: StepStatus) -> Vec<&str> {
        self.states
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.step_id.as_str())
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for state in &self.states {
            match state.status {
                StepStatus::Blocked => counts.blocked += 1,
                StepStatus::Ready => counts.ready += 1,
                StepStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    /// Returns `true` when every step is done.
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|s| s.status.is_done())
    }

    /// The states that differ from a previously persisted snapshot.
    ///
    /// `previous` is merged by precedence per step first; records for other
    /// runs are ignored. Steps absent from `previous` always count as
    /// changed.
    pub fn changed_from(&self, previous: &[StepState]) -> Vec<StepState> {
        let mut known: HashMap<&str, StepStatus> = HashMap::new();
        for state in previous.iter().filter(|s| s.run_id == self.run_id) {
            known
                .entry(state.step_id.as_str())
                .and_modify(|s| *s = s.merge(state.status))
                .or_insert(state.status);
        }

        self.states
            .iter()
            .filter(|s| known.get(s.step_id.as_str()) != Some(&s.status))
            .cloned()
            .collect()
    }

    pub fn into_states(self) -> Vec<StepState> {
        self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_definition::{FlowFile, StepDef, resolve};
    use pretty_assertions::assert_eq;

    fn diamond() -> FlowDefinition {
        resolve(
            &FlowFile::new("diamond")
                .with_step(StepDef::new("root"))
                .with_step(StepDef::new("left").needs(["root"]))
                .with_step(StepDef::new("right").needs(["root"]))
                .with_step(StepDef::new("join").needs(["left", "right"]).automated("merge")),
        )
        .unwrap()
    }

    #[test]
    fn fresh_run_has_only_roots_ready() {
        let eval = evaluate_flow(&diamond(), "r1", &[], &[]);
        assert_eq!(eval.steps_with(StepStatus::Ready), vec!["root"]);
        assert_eq!(eval.steps_with(StepStatus::Blocked), vec!["left", "right", "join"]);
        assert_eq!(eval.counts(), StatusCounts { blocked: 3, ready: 1, done: 0 });
        assert!(!eval.is_complete());
    }

    #[test]
    fn join_waits_for_every_dependency() {
        let def = diamond();
        let states = [StepState::done("r1", "root"), StepState::done("r1", "left")];
        let eval = evaluate_flow(&def, "r1", &states, &[]);
        assert_eq!(eval.status_of("right"), Some(StepStatus::Ready));
        assert_eq!(eval.status_of("join"), Some(StepStatus::Blocked));

        let inputs = [AvailableInput::new("r1", "right")];
        let eval = evaluate_flow(&def, "r1", &states, &inputs);
        assert_eq!(eval.status_of("join"), Some(StepStatus::Ready));
    }

    #[test]
    fn recorded_ready_does_not_override_blocked_dependencies() {
        let states = [StepState::new("r1", "join", StepStatus::Ready)];
        let eval = evaluate_flow(&diamond(), "r1", &states, &[]);
        assert_eq!(eval.status_of("join"), Some(StepStatus::Blocked));
    }

    #[test]
    fn conflicting_records_resolve_by_precedence() {
        let def = diamond();
        let forward = [
            StepState::new("r1", "root", StepStatus::Blocked),
            StepState::done("r1", "root"),
            StepState::new("r1", "root", StepStatus::Ready),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let a = evaluate_flow(&def, "r1", &forward, &[]);
        let b = evaluate_flow(&def, "r1", &backward, &[]);
        assert_eq!(a, b);
        assert_eq!(a.status_of("root"), Some(StepStatus::Done));
    }

    #[test]
    fn other_runs_and_unknown_steps_are_ignored() {
        let states = [StepState::done("r2", "root"), StepState::done("r1", "ghost")];
        let inputs = [AvailableInput::new("r2", "left"), AvailableInput::new("r1", "nope")];
        let eval = evaluate_flow(&diamond(), "r1", &states, &inputs);
        assert_eq!(eval, evaluate_flow(&diamond(), "r1", &[], &[]));
        assert_eq!(eval.states.len(), 4);
        assert!(eval.states.iter().all(|s| s.run_id == "r1"));
    }

    #[test]
    fn changed_from_reports_only_differences() {
        let def = diamond();
        let first = evaluate_flow(&def, "r1", &[], &[]);
        assert_eq!(first.changed_from(&[]).len(), 4);
        assert!(first.changed_from(&first.states).is_empty());

        let mut persisted = first.states.clone();
        persisted.push(StepState::done("r1", "root"));
        let second = evaluate_flow(&def, "r1", &persisted, &[]);
        let changed = second.changed_from(&persisted);
        assert_eq!(
            changed,
            vec![
                StepState::new("r1", "left", StepStatus::Ready),
                StepState::new("r1", "right", StepStatus::Ready),
            ]
        );
    }

    #[test]
    fn evaluation_serializes_states() {
        let eval = evaluate_flow(&diamond(), "r1", &[], &[]);
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["run_id"], "r1");
        assert_eq!(json["states"][0]["step_id"], "root");
        assert_eq!(json["states"][0]["status"], "ready");
    }
}
