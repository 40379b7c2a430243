//! Terminal styling for the flowstate CLI: color detection and status
//! rendering.

pub mod styles;
pub mod terminal;
