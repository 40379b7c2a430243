//! Discovery and creation of the `.flowstate/` directory.
//!
//! `.flowstate/` holds `config.yaml` and, by default, the SQLite database.
//! The project root is its parent directory.

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, Result};

/// The name of the flowstate metadata directory.
pub const FLOW_DIR_NAME: &str = ".flowstate";

/// Environment variable that overrides directory discovery.
pub const FLOW_DIR_ENV: &str = "FLOWSTATE_DIR";

/// Find the `.flowstate/` directory for `start`.
///
/// `FLOWSTATE_DIR` wins when it names an existing directory; otherwise the
/// tree is walked upward from `start` until a `.flowstate/` child is found.
pub fn find_flow_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(FLOW_DIR_ENV) {
        let env_path = PathBuf::from(env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }
    walk_up(start)
}

fn walk_up(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(FLOW_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Like [`find_flow_dir`], but a missing directory is an error.
///
/// # Errors
///
/// Returns [`ConfigError::FlowDirNotFound`].
pub fn find_flow_dir_or_error(start: &Path) -> Result<PathBuf> {
    find_flow_dir(start).ok_or(ConfigError::FlowDirNotFound)
}

/// Create `.flowstate/` under `path` (or `path` itself when it already ends
/// in `.flowstate`) and return it.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if the directory cannot be created.
pub fn ensure_flow_dir(path: &Path) -> Result<PathBuf> {
    let flow_dir = if path.ends_with(FLOW_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(FLOW_DIR_NAME)
    };
    std::fs::create_dir_all(&flow_dir)?;
    Ok(flow_dir)
}
