//! `flowctl` -- operator CLI for the flowstate workflow engine.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Tracks whether a Ctrl+C has already been received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Targets enabled by `--verbose`.
const VERBOSE_FILTER: &str = "flowctl=debug,flowstate_config=debug,flowstate_core=debug,\
                              flowstate_definition=debug,flowstate_engine=debug,\
                              flowstate_storage=debug";

fn main() {
    // First Ctrl+C exits cleanly, a second one forces exit.
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
        std::process::exit(130);
    });

    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);
    init_logging(&ctx);

    let result = match cli.command {
        Some(Commands::Init(args)) => commands::init::run(&ctx, &args),
        Some(Commands::Validate) => commands::validate::run(&ctx),
        Some(Commands::Graph(args)) => commands::graph::run(&ctx, &args),
        Some(Commands::Status(args)) => commands::status::run(&ctx, &args),
        Some(Commands::Plan(args)) => commands::plan::run(&ctx, &args),
        Some(Commands::Reconcile(args)) => commands::reconcile::run(&ctx, &args),
        Some(Commands::Complete(args)) => commands::complete::run(&ctx, &args),
        Some(Commands::Input(args)) => commands::input::run(&ctx, &args),
        Some(Commands::Jobs(args)) => commands::jobs::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
        Some(Commands::Version) => commands::version::run(&ctx),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        if ctx.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

/// `--verbose` enables debug output for every flowstate crate; otherwise
/// `RUST_LOG` applies, defaulting to warnings (errors with `--quiet`).
fn init_logging(ctx: &RuntimeContext) {
    let filter = if ctx.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if ctx.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(ctx.verbose)
        .init();
}
