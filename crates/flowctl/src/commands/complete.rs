//! `flowctl complete` -- report a step of a run as done.
//!
//! This is the completion report the job runtime sends once a job has
//! produced its deliverable. It can also be used by hand for manual steps.

use anyhow::{Result, bail};
use tracing::info;

use flowstate_core::StepState;
use flowstate_storage::StateStore;
use flowstate_ui::styles::{ICON_PASS, render_pass};

use crate::cli::StepArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `flowctl complete` command.
pub fn run(ctx: &RuntimeContext, args: &StepArgs) -> Result<()> {
    let definition = ctx.load_definition()?;
    if !definition.contains(&args.step_id) {
        bail!(
            "unknown step '{}' in flow '{}' (expected one of: {})",
            args.step_id,
            definition.name(),
            definition.topological_ids().join(", ")
        );
    }

    let store = ctx.open_store()?;
    // A dispatched job is finished together with its step; a step with no
    // job (manual, or done by hand before dispatch) only gets its state.
    let finished = match store.finish_job(&args.run_id, &args.step_id) {
        Ok(finished) => finished,
        Err(e) if e.is_not_found() => {
            store.upsert_states(&[StepState::done(&args.run_id, &args.step_id)])?;
            0
        }
        Err(e) => return Err(e.into()),
    };
    info!(run = %args.run_id, step = %args.step_id, finished, "step completed");

    if ctx.json {
        output_json(&serde_json::json!({
            "run_id": args.run_id,
            "step_id": args.step_id,
            "status": "done",
            "jobs_finished": finished,
        }));
    } else if !ctx.quiet {
        println!(
            "{} {} {} is done",
            render_pass(ICON_PASS),
            args.run_id,
            args.step_id
        );
        if finished > 0 {
            println!("  finished {} queued job(s)", finished);
        }
    }
    Ok(())
}
