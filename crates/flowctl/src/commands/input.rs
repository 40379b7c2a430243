//! `flowctl input` -- record that a step's deliverable is available.

use anyhow::{Result, bail};
use tracing::info;

use flowstate_core::AvailableInput;
use flowstate_storage::EvidenceStore;
use flowstate_ui::styles::{ICON_PASS, render_muted, render_pass};

use crate::cli::InputArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `flowctl input` command.
pub fn run(ctx: &RuntimeContext, args: &InputArgs) -> Result<()> {
    let definition = ctx.load_definition()?;
    if !definition.contains(&args.step_id) {
        bail!(
            "unknown step '{}' in flow '{}' (expected one of: {})",
            args.step_id,
            definition.name(),
            definition.topological_ids().join(", ")
        );
    }

    let mut input = AvailableInput::new(&args.run_id, &args.step_id);
    if let Some(reference) = &args.reference {
        input = input.with_reference(reference);
    }

    let store = ctx.open_store()?;
    store.record_input(&input)?;
    info!(run = %args.run_id, step = %args.step_id, "recorded available input");

    if ctx.json {
        output_json(&input);
    } else if !ctx.quiet {
        let mut line = format!(
            "{} recorded input for {} {}",
            render_pass(ICON_PASS),
            input.run_id,
            input.step_id
        );
        if !input.reference.is_empty() {
            line.push_str(&render_muted(&format!(" ({})", input.reference)));
        }
        println!("{}", line);
        println!("  Run `flowctl reconcile {}` to apply it.", input.run_id);
    }
    Ok(())
}
