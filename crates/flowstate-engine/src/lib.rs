//! Step evaluator and job planner for the flowstate system.
//!
//! Both entry points are pure functions over a resolved
//! [`FlowDefinition`](flowstate_definition::FlowDefinition):
//!
//! - [`evaluate_flow`] computes the status of every step of one run from
//!   recorded step states and available-input evidence.
//! - [`plan_jobs`] turns evaluated states into the jobs that should be
//!   dispatched now.
//!
//! Neither performs I/O or keeps state between calls, so they can be
//! re-run at any time, from any thread, with identical results.

pub mod evaluator;
pub mod planner;

pub use evaluator::{Evaluation, StatusCounts, evaluate_flow};
pub use planner::plan_jobs;
