//! Definition file data model.

use serde::{Deserialize, Serialize};

/// The only definition schema version this crate understands.
pub const SUPPORTED_VERSION: i32 = 1;

/// Root structure for `.flow.toml` / `.flow.json` files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowFile {
    /// Name of the flow.
    pub flow: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Schema version. `0` means the file did not say.
    #[serde(default)]
    pub version: i32,

    /// Steps in declaration order.
    #[serde(default)]
    pub steps: Vec<StepDef>,

    /// Where this file was loaded from (set by the parser).
    #[serde(skip)]
    pub source: String,
}

impl FlowFile {
    pub fn new(flow: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            description: String::new(),
            version: SUPPORTED_VERSION,
            steps: Vec::new(),
            source: String::new(),
        }
    }

    /// Appends a step.
    pub fn with_step(mut self, step: StepDef) -> Self {
        self.steps.push(step);
        self
    }
}

/// One step as written in a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDef {
    /// Unique identifier within the flow.
    pub id: String,

    /// Display title (defaults to the id when empty).
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Step IDs that must all be done before this step is ready.
    #[serde(default)]
    pub needs: Vec<String>,

    /// Job to enqueue when the step becomes ready. Steps without one are
    /// manual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation: Option<Automation>,
}

impl StepDef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            needs: Vec::new(),
            automation: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn needs<I, S>(mut self, needs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs = needs.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the step automatable with the given job type.
    pub fn automated(mut self, job: impl Into<String>) -> Self {
        self.automation = Some(Automation { job: job.into() });
        self
    }
}

/// Automation descriptor: which job type fulfils the step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Automation {
    pub job: String,
}

/// Errors raised while loading or resolving a definition.
///
/// All of these are fatal configuration errors: a process must not serve
/// evaluations against a definition that failed to resolve.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("definition '{0}' not found")]
    NotFound(String),

    #[error("definition has no steps")]
    NoSteps,

    #[error("unsupported definition version {0} (expected {expected})", expected = SUPPORTED_VERSION)]
    UnsupportedVersion(i32),

    #[error("step #{position} has an empty id")]
    EmptyStepId { position: usize },

    #[error("duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    #[error("step '{0}' has an automation with an empty job type")]
    EmptyJobType(String),

    #[error("dependency cycle among steps: {}", steps.join(", "))]
    Cycle { steps: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DefinitionError {
    /// The step ids this error points at, if any.
    pub fn offending_steps(&self) -> Vec<&str> {
        match self {
            Self::DuplicateStep(id) | Self::EmptyJobType(id) => vec![id.as_str()],
            Self::UnknownDependency { step, .. } => vec![step.as_str()],
            Self::Cycle { steps } => steps.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_produces_step_defs() {
        let file = FlowFile::new("demo")
            .with_step(StepDef::new("a").title("First"))
            .with_step(StepDef::new("b").needs(["a"]).automated("send_mail"));

        assert_eq!(file.steps.len(), 2);
        assert_eq!(file.steps[0].title, "First");
        assert_eq!(file.steps[1].needs, vec!["a"]);
        assert_eq!(
            file.steps[1].automation,
            Some(Automation { job: "send_mail".into() })
        );
    }

    #[test]
    fn cycle_error_lists_steps() {
        let err = DefinitionError::Cycle {
            steps: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle among steps: a, b");
        assert_eq!(err.offending_steps(), vec!["a", "b"]);
    }
}
