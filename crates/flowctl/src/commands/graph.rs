//! `flowctl graph` -- show the dependency graph of the flow definition.

use std::io::{self, Write};

use anyhow::Result;

use flowstate_definition::FlowDefinition;
use flowstate_ui::styles::{ICON_AUTOMATED, TREE_BRANCH, TREE_LAST, render_category, render_muted};

use crate::cli::GraphArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `flowctl graph` command.
pub fn run(ctx: &RuntimeContext, args: &GraphArgs) -> Result<()> {
    let definition = ctx.load_definition()?;

    if ctx.json {
        let layers: Vec<Vec<&str>> = definition
            .layers()
            .iter()
            .map(|layer| layer.iter().map(|s| s.id.as_str()).collect())
            .collect();
        let steps: Vec<_> = definition.in_order().collect();
        output_json(&serde_json::json!({
            "flow": definition.name(),
            "layers": layers,
            "steps": steps,
        }));
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.dot {
        write_dot(&mut out, &definition)?;
    } else {
        write_layers(&mut out, &definition)?;
    }
    Ok(())
}

/// One section per layer, each step followed by what it needs and what
/// waits on it.
fn write_layers<W: Write>(w: &mut W, definition: &FlowDefinition) -> io::Result<()> {
    writeln!(w, "{}", render_category(definition.name()))?;
    for (i, layer) in definition.layers().iter().enumerate() {
        writeln!(w)?;
        writeln!(w, "Layer {}", i)?;
        for (j, step) in layer.iter().enumerate() {
            let branch = if j + 1 == layer.len() { TREE_LAST } else { TREE_BRANCH };
            let mut line = format!("{}{}", branch, step.id);
            if !step.needs.is_empty() {
                line.push_str(&render_muted(&format!(" <- {}", step.needs.join(", "))));
            }
            let downstream: Vec<&str> = definition
                .dependents(&step.id)
                .iter()
                .map(|d| d.id.as_str())
                .collect();
            if !downstream.is_empty() {
                line.push_str(&render_muted(&format!(" -> {}", downstream.join(", "))));
            }
            if let Some(job) = step.job_type() {
                line.push_str(&format!("  {} {}", ICON_AUTOMATED, job));
            }
            writeln!(w, "{}", line)?;
        }
    }
    Ok(())
}

/// Graphviz digraph; automated steps are drawn as boxes.
fn write_dot<W: Write>(w: &mut W, definition: &FlowDefinition) -> io::Result<()> {
    writeln!(w, "digraph {} {{", quote(definition.name()))?;
    writeln!(w, "  rankdir=LR;")?;
    for step in definition.in_order() {
        let shape = if step.is_automatable() { "box" } else { "ellipse" };
        let label = match step.job_type() {
            Some(job) => format!("{}\\n[{}]", step.display_title(), job),
            None => step.display_title().to_string(),
        };
        writeln!(
            w,
            "  {} [label={}, shape={}];",
            quote(&step.id),
            quote(&label),
            shape
        )?;
    }
    for step in definition.in_order() {
        for dep in &step.needs {
            writeln!(w, "  {} -> {};", quote(dep), quote(&step.id))?;
        }
    }
    writeln!(w, "}}")
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}
