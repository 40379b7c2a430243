//! Per-run step records: recorded states and available-input evidence.

use serde::{Deserialize, Serialize};

use crate::enums::StepStatus;

/// The status of one step within one run.
///
/// Produced by the evaluator and by the job runtime when it reports a
/// completion. Several records may exist for the same (run, step); they are
/// reconciled with [`StepStatus::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepState {
    pub run_id: String,

    pub step_id: String,

    pub status: StepStatus,
}

impl StepState {
    pub fn new(run_id: impl Into<String>, step_id: impl Into<String>, status: StepStatus) -> Self {
        Self {
            run_id: run_id.into(),
            step_id: step_id.into(),
            status,
        }
    }

    /// Shorthand for a `done` record, the shape completion reports take.
    pub fn done(run_id: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self::new(run_id, step_id, StepStatus::Done)
    }
}

/// Evidence that a step's deliverable already exists out of band.
///
/// For example, a document that was uploaded by hand instead of generated
/// by a job. Its presence counts as the step being done.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailableInput {
    pub run_id: String,

    pub step_id: String,

    /// Where the deliverable lives (free-form, not interpreted).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
}

impl AvailableInput {
    pub fn new(run_id: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            step_id: step_id.into(),
            reference: String::new(),
        }
    }

    /// Attaches a reference to the out-of-band deliverable.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }
}
