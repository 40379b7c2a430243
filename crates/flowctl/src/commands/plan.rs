//! `flowctl plan` -- show the jobs a run would dispatch, without
//! dispatching them.

use anyhow::Result;

use flowstate_engine::{evaluate_flow, plan_jobs};
use flowstate_storage::{EvidenceStore, StateStore};

use crate::cli::RunArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `flowctl plan` command.
pub fn run(ctx: &RuntimeContext, args: &RunArgs) -> Result<()> {
    let definition = ctx.load_definition()?;
    let store = ctx.open_store()?;

    let states = store.states_for_run(&args.run_id)?;
    let inputs = store.inputs_for_run(&args.run_id)?;
    let evaluation = evaluate_flow(&definition, &args.run_id, &states, &inputs);
    let jobs = plan_jobs(&definition, &evaluation.states);

    if ctx.json {
        output_json(&jobs);
        return Ok(());
    }

    if jobs.is_empty() {
        if !ctx.quiet {
            println!("No jobs to dispatch for run {}.", args.run_id);
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|job| vec![job.step_id.clone(), job.job_type.clone()])
        .collect();
    output_table(&["STEP", "TYPE"], &rows);
    Ok(())
}
