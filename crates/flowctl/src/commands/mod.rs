//! Command handlers, one module per subcommand.

pub mod complete;
pub mod completion;
pub mod graph;
pub mod init;
pub mod input;
pub mod jobs;
pub mod plan;
pub mod reconcile;
pub mod status;
pub mod validate;
pub mod version;
