//! `flowctl jobs` -- list the dispatch outbox.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use flowstate_ui::styles::render_job_status;

use crate::cli::JobsArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `flowctl jobs` command.
pub fn run(ctx: &RuntimeContext, args: &JobsArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let jobs = store.list_jobs(args.run.as_deref())?;

    if ctx.json {
        output_json(&jobs);
        return Ok(());
    }

    if jobs.is_empty() {
        if !ctx.quiet {
            println!("No jobs.");
        }
        return Ok(());
    }

    // Status is colored, so it goes last where no padding is computed.
    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|record| {
            vec![
                record.job.run_id.clone(),
                record.job.step_id.clone(),
                record.job.job_type.clone(),
                format_local(&record.created_at),
                render_job_status(record.status),
            ]
        })
        .collect();
    output_table(&["RUN", "STEP", "TYPE", "CREATED", "STATUS"], &rows);
    Ok(())
}

/// Timestamps are stored in UTC and shown in local time.
fn format_local(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
