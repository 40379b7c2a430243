//! Clap CLI definitions for the `flowctl` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// flowctl -- evaluate workflow runs and plan their automated jobs.
#[derive(Parser, Debug)]
#[command(
    name = "flowctl",
    about = "Workflow step evaluator and job planner",
    long_about = "Evaluates which steps of a workflow run are blocked, ready or done, \
                  and enqueues the jobs for ready automated steps.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project directory or its .flowstate directory (default: search upward).
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Flow definition file or name (default: `definition` from config.yaml).
    #[arg(long, global = true)]
    pub definition: Option<String>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create .flowstate/ with config.yaml and the database.
    Init(InitArgs),

    /// Check the flow definition and print its step order.
    Validate,

    /// Show the dependency graph of the flow definition.
    Graph(GraphArgs),

    /// Evaluate a run without writing anything.
    Status(RunArgs),

    /// Show the jobs a run would dispatch now, without dispatching them.
    Plan(RunArgs),

    /// Evaluate runs, persist changed states, and enqueue ready jobs.
    Reconcile(ReconcileArgs),

    /// Report a step of a run as done.
    Complete(StepArgs),

    /// Record that a step's deliverable is already available.
    Input(InputArgs),

    /// List dispatched jobs.
    Jobs(JobsArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Also write an example flow definition if none exists.
    #[arg(long)]
    pub example: bool,

    /// Rewrite config.yaml even if the directory is already initialized.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Output Graphviz DOT format.
    #[arg(long)]
    pub dot: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run identifier.
    pub run_id: String,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Run identifiers to reconcile.
    #[arg(required_unless_present = "all")]
    pub runs: Vec<String>,

    /// Reconcile every run with recorded state or input.
    #[arg(long, conflicts_with = "runs")]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct StepArgs {
    /// Run identifier.
    pub run_id: String,

    /// Step identifier.
    pub step_id: String,
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Run identifier.
    pub run_id: String,

    /// Step identifier.
    pub step_id: String,

    /// Where the deliverable can be found.
    #[arg(long)]
    pub reference: Option<String>,
}

#[derive(Args, Debug)]
pub struct JobsArgs {
    /// Only show jobs of this run.
    #[arg(long)]
    pub run: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

/// Completion subcommands.
#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate Bash completions.
    Bash,
    /// Generate Zsh completions.
    Zsh,
    /// Generate Fish completions.
    Fish,
    /// Generate PowerShell completions.
    Powershell,
}
