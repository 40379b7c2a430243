//! `flowctl reconcile` -- evaluate runs, persist changed states, and
//! enqueue the jobs of ready automated steps.

use anyhow::{Context, Result, bail};

use flowstate_storage::sqlite::config::DEFINITION_FINGERPRINT_KEY;
use flowstate_storage::{ReconcileReport, StateStore, reconcile_run};
use flowstate_ui::styles::{render_accent, render_muted, render_pass};

use crate::cli::ReconcileArgs;
use crate::context::{RuntimeContext, definition_changed};
use crate::output::output_json;

/// Execute the `flowctl reconcile` command.
pub fn run(ctx: &RuntimeContext, args: &ReconcileArgs) -> Result<()> {
    let definition = ctx.load_definition()?;
    let store = ctx.open_store()?;

    let runs = if args.all {
        let runs = store.runs()?;
        if runs.is_empty() {
            bail!("no runs with recorded state or input");
        }
        runs
    } else {
        args.runs.clone()
    };

    definition_changed(&store, &definition)?;

    let mut reports: Vec<ReconcileReport> = Vec::with_capacity(runs.len());
    for run_id in &runs {
        let report = reconcile_run(&definition, run_id, &store, &store, &store)
            .with_context(|| format!("failed to reconcile run {}", run_id))?;
        reports.push(report);
    }

    store.set_config(DEFINITION_FINGERPRINT_KEY, definition.fingerprint())?;

    if ctx.json {
        output_json(&reports);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    for report in &reports {
        print_report(report);
    }
    Ok(())
}

fn print_report(report: &ReconcileReport) {
    let counts = report.evaluation.counts();
    let mut line = format!(
        "{}: {} done, {} ready, {} blocked",
        render_accent(&report.run_id),
        counts.done,
        counts.ready,
        counts.blocked
    );
    if report.evaluation.is_complete() {
        line.push_str(&render_pass(" (complete)"));
    }
    println!("{}", line);

    if !report.changed.is_empty() {
        let changed: Vec<String> = report
            .changed
            .iter()
            .map(|s| format!("{}={}", s.step_id, s.status))
            .collect();
        println!("  updated: {}", changed.join(", "));
    }
    for job in &report.jobs {
        println!("  job: {} ({})", job.job_type, job.step_id);
    }
    if report.enqueued > 0 || report.duplicates > 0 {
        println!(
            "  {}",
            render_muted(&format!(
                "{} enqueued, {} already queued",
                report.enqueued, report.duplicates
            ))
        );
    }
}
