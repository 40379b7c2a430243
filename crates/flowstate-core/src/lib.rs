//! Core record types for the flowstate system.
//!
//! These are the minimal records the evaluator and planner consume and
//! produce: per-run step states, available-input evidence, and jobs.

pub mod enums;
pub mod job;
pub mod state;

pub use enums::{JobStatus, ParseEnumError, StepStatus};
pub use job::Job;
pub use state::{AvailableInput, StepState};
