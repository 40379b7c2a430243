//! Collaborators of the flowstate engine.
//!
//! The evaluator and planner never touch storage themselves. This crate
//! defines the seams they are driven through ([`StateStore`],
//! [`EvidenceStore`], [`JobDispatcher`]), two implementations of all three
//! ([`MemoryStore`] and [`SqliteStore`]), and [`reconcile_run`], the
//! read, evaluate, persist, plan, dispatch cycle.

pub mod error;
pub mod memory;
pub mod reconcile;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use reconcile::{ReconcileReport, reconcile_run};
pub use sqlite::SqliteStore;
pub use traits::{DispatchOutcome, EvidenceStore, JobDispatcher, JobRecord, StateStore};
