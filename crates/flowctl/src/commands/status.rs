//! `flowctl status` -- evaluate a run without writing anything.

use std::collections::HashSet;

use anyhow::Result;

use flowstate_engine::evaluate_flow;
use flowstate_storage::{EvidenceStore, StateStore};
use flowstate_ui::styles::{ICON_AUTOMATED, render_bold, render_muted, render_pass, render_status};

use crate::cli::RunArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `flowctl status` command.
pub fn run(ctx: &RuntimeContext, args: &RunArgs) -> Result<()> {
    let definition = ctx.load_definition()?;
    let store = ctx.open_store()?;

    let states = store.states_for_run(&args.run_id)?;
    let inputs = store.inputs_for_run(&args.run_id)?;
    let evaluation = evaluate_flow(&definition, &args.run_id, &states, &inputs);
    let counts = evaluation.counts();

    if ctx.json {
        output_json(&serde_json::json!({
            "run_id": evaluation.run_id,
            "flow": definition.name(),
            "states": evaluation.states,
            "counts": counts,
            "complete": evaluation.is_complete(),
        }));
        return Ok(());
    }

    let with_input: HashSet<&str> = inputs.iter().map(|i| i.step_id.as_str()).collect();

    println!(
        "{} {}",
        render_bold(&format!("Run {}", evaluation.run_id)),
        render_muted(&format!("({})", definition.name()))
    );
    println!();
    for state in &evaluation.states {
        let title = definition
            .get(&state.step_id)
            .map(|s| s.display_title())
            .unwrap_or(&state.step_id);
        let mut line = format!(
            "  {}  {}",
            render_status(state.status),
            state.step_id
        );
        if title != state.step_id {
            line.push_str(&render_muted(&format!("  {}", title)));
        }
        if with_input.contains(state.step_id.as_str()) {
            line.push_str(&render_muted("  [input]"));
        }
        if let Some(job) = definition.get(&state.step_id).and_then(|s| s.job_type()) {
            line.push_str(&format!("  {} {}", ICON_AUTOMATED, render_muted(job)));
        }
        println!("{}", line);
    }
    println!();

    let summary = format!(
        "{} done, {} ready, {} blocked",
        counts.done, counts.ready, counts.blocked
    );
    if evaluation.is_complete() {
        println!("{}", render_pass(&format!("{} (complete)", summary)));
    } else {
        println!("{}", summary);
    }
    Ok(())
}
