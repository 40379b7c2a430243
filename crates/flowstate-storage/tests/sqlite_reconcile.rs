//! Reconciliation against a file-backed SQLite store.

use std::sync::Arc;
use std::thread;

use flowstate_core::{AvailableInput, JobStatus, StepState, StepStatus};
use flowstate_definition::{FlowDefinition, FlowFile, StepDef, resolve};
use flowstate_storage::{EvidenceStore, SqliteStore, StateStore, reconcile_run};
use pretty_assertions::assert_eq;

fn renovation() -> FlowDefinition {
    resolve(
        &FlowFile::new("renovation")
            .with_step(StepDef::new("project_intake"))
            .with_step(StepDef::new("budget_base").needs(["project_intake"]))
            .with_step(StepDef::new("measurement").needs(["budget_base"]))
            .with_step(
                StepDef::new("certificate")
                    .needs(["measurement"])
                    .automated("generate_certificate"),
            ),
    )
    .unwrap()
}

#[test]
fn full_lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flowstate.db");
    let def = renovation();

    {
        let store = SqliteStore::open(&path).unwrap();
        store
            .upsert_states(&[StepState::done("run-1", "project_intake")])
            .unwrap();
        store
            .record_input(&AvailableInput::new("run-1", "budget_base"))
            .unwrap();
        let report = reconcile_run(&def, "run-1", &store, &store, &store).unwrap();
        assert_eq!(report.evaluation.status_of("measurement"), Some(StepStatus::Ready));
        assert!(report.jobs.is_empty());
    }

    let store = SqliteStore::open(&path).unwrap();
    store
        .upsert_states(&[StepState::done("run-1", "measurement")])
        .unwrap();
    let report = reconcile_run(&def, "run-1", &store, &store, &store).unwrap();
    assert_eq!(report.enqueued, 1);

    assert_eq!(store.finish_job("run-1", "certificate").unwrap(), 1);
    let report = reconcile_run(&def, "run-1", &store, &store, &store).unwrap();
    assert!(report.evaluation.is_complete());

    let jobs = store.list_jobs(Some("run-1")).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Finished);
}

#[test]
fn stale_evaluation_cannot_demote_a_completion() {
    let store = SqliteStore::open_in_memory().unwrap();
    let def = renovation();
    let stale = flowstate_engine::evaluate_flow(&def, "run-1", &[], &[]);

    store
        .upsert_states(&[StepState::done("run-1", "project_intake")])
        .unwrap();
    store.upsert_states(&stale.states).unwrap();

    let persisted = store.states_for_run("run-1").unwrap();
    assert!(persisted.contains(&StepState::done("run-1", "project_intake")));
}

#[test]
fn concurrent_runs_share_one_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("flowstate.db")).unwrap());
    let def = Arc::new(renovation());

    let runs: Vec<String> = (0..8).map(|i| format!("run-{i}")).collect();
    for run in &runs {
        store
            .upsert_states(&[
                StepState::done(run.as_str(), "project_intake"),
                StepState::done(run.as_str(), "measurement"),
            ])
            .unwrap();
        store
            .record_input(&AvailableInput::new(run.as_str(), "budget_base"))
            .unwrap();
    }

    thread::scope(|scope| {
        for run in &runs {
            for _ in 0..2 {
                let store = Arc::clone(&store);
                let def = Arc::clone(&def);
                scope.spawn(move || {
                    reconcile_run(&def, run, store.as_ref(), store.as_ref(), store.as_ref()).unwrap()
                });
            }
        }
    });

    let jobs = store.list_jobs(None).unwrap();
    assert_eq!(jobs.len(), runs.len());
    assert_eq!(store.runs().unwrap(), runs);
    for run in &runs {
        let states = store.states_for_run(run).unwrap();
        assert!(states.contains(&StepState::new(run.as_str(), "certificate", StepStatus::Ready)));
    }
}
