//! End-to-end evaluation and planning over the renovation grant flow.

use flowstate_core::{AvailableInput, Job, StepState, StepStatus};
use flowstate_definition::{FlowDefinition, FlowFile, StepDef, resolve};
use flowstate_engine::{evaluate_flow, plan_jobs};
use pretty_assertions::assert_eq;

const RUN: &str = "run-1";

fn renovation() -> FlowDefinition {
    resolve(
        &FlowFile::new("renovation")
            .with_step(StepDef::new("project_intake").title("Project intake"))
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
fn nothing_recorded_leaves_the_chain_blocked() {
    let eval = evaluate_flow(&renovation(), RUN, &[], &[]);
    assert_eq!(eval.status_of("project_intake"), Some(StepStatus::Ready));
    assert_eq!(eval.status_of("budget_base"), Some(StepStatus::Blocked));
    assert_eq!(eval.status_of("measurement"), Some(StepStatus::Blocked));
    assert_eq!(eval.status_of("certificate"), Some(StepStatus::Blocked));
}

#[test]
fn available_input_completes_budget_base() {
    let inputs = [AvailableInput::new(RUN, "budget_base")];
    let eval = evaluate_flow(&renovation(), RUN, &[], &inputs);
    assert_eq!(eval.status_of("budget_base"), Some(StepStatus::Done));
    assert_eq!(eval.status_of("measurement"), Some(StepStatus::Ready));
    assert_eq!(eval.status_of("certificate"), Some(StepStatus::Blocked));
}

#[test]
fn done_measurement_makes_certificate_ready() {
    let states = [StepState::done(RUN, "measurement")];
    let inputs = [AvailableInput::new(RUN, "budget_base")];
    let eval = evaluate_flow(&renovation(), RUN, &states, &inputs);
    assert_eq!(eval.status_of("certificate"), Some(StepStatus::Ready));
}

#[test]
fn ready_certificate_plans_one_generation_job() {
    let states = [StepState::new(RUN, "certificate", StepStatus::Ready)];
    assert_eq!(
        plan_jobs(&renovation(), &states),
        vec![Job::new("generate_certificate", "certificate", RUN)]
    );
}

#[test]
fn evaluate_then_plan_walks_the_whole_flow() {
    let def = renovation();
    let mut states: Vec<StepState> = Vec::new();
    let inputs = [AvailableInput::new(RUN, "budget_base")];

    states.push(StepState::done(RUN, "project_intake"));
    let eval = evaluate_flow(&def, RUN, &states, &inputs);
    assert_eq!(eval.steps_with(StepStatus::Ready), vec!["measurement"]);
    assert!(plan_jobs(&def, &eval.states).is_empty());

    states.push(StepState::done(RUN, "measurement"));
    let eval = evaluate_flow(&def, RUN, &states, &inputs);
    let jobs = plan_jobs(&def, &eval.states);
    assert_eq!(jobs, vec![Job::new("generate_certificate", "certificate", RUN)]);

    // The job runtime reports completion back as a done state.
    states.push(StepState::done(RUN, "certificate"));
    let eval = evaluate_flow(&def, RUN, &states, &inputs);
    assert!(eval.is_complete());
    assert!(plan_jobs(&def, &eval.states).is_empty());
}

#[test]
fn definition_loaded_from_toml_matches_the_builder() {
    let file = flowstate_definition::parser::parse_toml(
        r#"
flow = "renovation"

[[steps]]
id = "project_intake"
title = "Project intake"

[[steps]]
id = "budget_base"
needs = ["project_intake"]

[[steps]]
id = "measurement"
needs = ["budget_base"]

[[steps]]
id = "certificate"
needs = ["measurement"]
automation = { job = "generate_certificate" }
"#,
    )
    .unwrap();
    let def = resolve(&file).unwrap();
    assert_eq!(def.fingerprint(), renovation().fingerprint());

    let states = [StepState::new(RUN, "certificate", StepStatus::Ready)];
    assert_eq!(plan_jobs(&def, &states).len(), 1);
}
