//! Job -- a dispatch request for a ready, automatable step.

use serde::{Deserialize, Serialize};

/// An instruction to the external dispatcher.
///
/// Jobs carry no state of their own; execution and retries belong to the
/// job runtime. `(run_id, step_id, job_type)` is the natural dedupe key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    /// Job type (serialised as "type" in JSON).
    #[serde(rename = "type")]
    pub job_type: String,

    pub step_id: String,

    pub run_id: String,
}

impl Job {
    pub fn new(
        job_type: impl Into<String>,
        step_id: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            job_type: job_type.into(),
            step_id: step_id.into(),
            run_id: run_id.into(),
        }
    }

    /// The key a dispatcher uses to make enqueueing idempotent.
    pub fn dedupe_key(&self) -> (&str, &str, &str) {
        (&self.run_id, &self.step_id, &self.job_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_serializes_type_field() {
        let job = Job::new("generate_certificate", "certificate", "run-1");
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains(r#""type":"generate_certificate""#));

        let back: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
        assert_eq!(back.dedupe_key(), ("run-1", "certificate", "generate_certificate"));
    }
}
