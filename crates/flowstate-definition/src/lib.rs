//! Flow definitions for the flowstate system.
//!
//! A flow definition is the static graph of steps a run goes through: each
//! step names the steps it needs and, optionally, the job type to enqueue
//! once it becomes ready. Definitions are written as TOML or JSON files,
//! parsed into a [`FlowFile`], and resolved once into an immutable
//! [`FlowDefinition`] that caches a topological order.

pub mod content_hash;
pub mod parser;
pub mod resolver;
pub mod types;

pub use resolver::{FlowDefinition, Step, resolve};
pub use types::{Automation, DefinitionError, FlowFile, SUPPORTED_VERSION, StepDef};
