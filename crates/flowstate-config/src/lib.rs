//! Configuration management for the flowstate system.
//!
//! This crate handles loading and saving `.flowstate/config.yaml`,
//! discovering the `.flowstate/` directory from the current directory, and
//! resolving the definition and database paths it names.

pub mod config;
pub mod flow_dir;

pub use config::{ConfigError, FlowConfig, load_config, save_config};
pub use flow_dir::{ensure_flow_dir, find_flow_dir, find_flow_dir_or_error};
