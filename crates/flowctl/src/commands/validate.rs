//! `flowctl validate` -- resolve the definition and report its order.

use anyhow::Result;

use flowstate_ui::styles::{ICON_AUTOMATED, ICON_PASS, render_muted, render_pass};

use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `flowctl validate` command.
///
/// Loading already rejects an invalid definition, so reaching the report
/// means it resolved.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let definition = ctx.load_definition()?;

    let order: Vec<&str> = definition.topological_ids();
    let automated: Vec<serde_json::Value> = definition
        .in_order()
        .filter_map(|step| {
            step.job_type()
                .map(|job| serde_json::json!({"step": step.id, "job": job}))
        })
        .collect();

    if ctx.json {
        output_json(&serde_json::json!({
            "valid": true,
            "flow": definition.name(),
            "fingerprint": definition.fingerprint(),
            "steps": definition.len(),
            "order": order,
            "automated": automated,
        }));
        return Ok(());
    }

    if ctx.quiet {
        return Ok(());
    }

    println!(
        "{} {} is valid ({} steps)",
        render_pass(ICON_PASS),
        definition.name(),
        definition.len()
    );
    println!("  {}", render_muted(&format!("fingerprint {}", definition.fingerprint())));
    println!();
    for (i, step) in definition.in_order().enumerate() {
        let marker = match step.job_type() {
            Some(job) => format!("  {} {}", ICON_AUTOMATED, render_muted(job)),
            None => String::new(),
        };
        println!("  {:>2}. {}{}", i + 1, step.id, marker);
    }
    Ok(())
}
