//! SQLite-backed storage implementation.

pub mod config;
mod inputs;
mod jobs;
pub mod schema;
mod states;
mod store;

pub use store::SqliteStore;
