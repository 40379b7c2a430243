//! Runtime context for command execution.
//!
//! [`RuntimeContext`] holds the global flags and knows how to locate the
//! `.flowstate/` directory, its configuration, the flow definition, and the
//! database.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use flowstate_config::flow_dir::FLOW_DIR_NAME;
use flowstate_config::{FlowConfig, find_flow_dir_or_error, load_config};
use flowstate_definition::FlowDefinition;
use flowstate_definition::parser::find_definition;
use flowstate_storage::SqliteStore;
use flowstate_storage::sqlite::config::DEFINITION_FINGERPRINT_KEY;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
#[derive(Debug)]
pub struct RuntimeContext {
    /// `--dir`, if given.
    pub dir: Option<PathBuf>,

    /// `--definition`, if given.
    pub definition: Option<String>,

    /// Whether to produce JSON output (flag or `json: true` in config).
    pub json: bool,

    pub verbose: bool,

    pub quiet: bool,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        let mut ctx = Self {
            dir: global.dir.clone(),
            definition: global.definition.clone(),
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        };

        // A broken config is reported by the command that needs it.
        if !ctx.json {
            if let Ok((_, config)) = ctx.config() {
                ctx.json = config.json;
            }
        }
        ctx
    }

    /// The directory `flowctl init` creates `.flowstate/` in.
    pub fn base_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => env::current_dir().context("failed to get current directory"),
        }
    }

    /// Locate `.flowstate/`: under `--dir` if given, otherwise by walking up
    /// from the current directory.
    pub fn flow_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => {
                let candidate = if dir.ends_with(FLOW_DIR_NAME) {
                    dir.clone()
                } else {
                    dir.join(FLOW_DIR_NAME)
                };
                if !candidate.is_dir() {
                    bail!(
                        "no .flowstate directory at {} (run 'flowctl init' first)",
                        candidate.display()
                    );
                }
                Ok(candidate)
            }
            None => {
                let cwd = env::current_dir().context("failed to get current directory")?;
                Ok(find_flow_dir_or_error(&cwd)?)
            }
        }
    }

    /// The `.flowstate/` directory and its loaded configuration.
    pub fn config(&self) -> Result<(PathBuf, FlowConfig)> {
        let flow_dir = self.flow_dir()?;
        let config = load_config(&flow_dir)
            .with_context(|| format!("failed to load config from {}", flow_dir.display()))?;
        Ok((flow_dir, config))
    }

    /// Resolve the definition file.
    ///
    /// `--definition` is searched in the current directory, then the project
    /// root; it works without a `.flowstate/` directory. Otherwise the
    /// configured definition is resolved against the project root.
    pub fn definition_path(&self) -> Result<PathBuf> {
        let flow_dir = self.flow_dir();
        let root = flow_dir
            .as_ref()
            .ok()
            .and_then(|d| d.parent())
            .map(Path::to_path_buf);

        if let Some(name) = &self.definition {
            let cwd = env::current_dir().context("failed to get current directory")?;
            let mut dirs: Vec<&Path> = vec![cwd.as_path()];
            if let Some(root) = &root {
                dirs.push(root.as_path());
            }
            return Ok(find_definition(name, &dirs)?);
        }

        let (flow_dir, config) = self.config()?;
        let path = config.definition_path(&flow_dir);
        if !path.is_file() {
            bail!(
                "flow definition {} not found (set `definition` in {} or pass --definition)",
                path.display(),
                flow_dir.join("config.yaml").display()
            );
        }
        Ok(path)
    }

    /// Load and resolve the flow definition.
    pub fn load_definition(&self) -> Result<FlowDefinition> {
        let path = self.definition_path()?;
        let definition = FlowDefinition::load(&path)
            .with_context(|| format!("invalid flow definition {}", path.display()))?;
        debug!(
            path = %path.display(),
            flow = definition.name(),
            steps = definition.len(),
            "loaded flow definition"
        );
        Ok(definition)
    }

    /// Open the configured SQLite database.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let (flow_dir, config) = self.config()?;
        let path = config.database_path(&flow_dir);
        SqliteStore::open(&path)
            .with_context(|| format!("failed to open database {}", path.display()))
    }
}

/// Warn when the definition differs from the one the database was last
/// reconciled with. Returns `true` if it does.
pub fn definition_changed(store: &SqliteStore, definition: &FlowDefinition) -> Result<bool> {
    let previous = store.get_config(DEFINITION_FINGERPRINT_KEY)?;
    match previous {
        Some(prev) if prev != definition.fingerprint() => {
            warn!(
                previous = %prev,
                current = definition.fingerprint(),
                "flow definition changed since the last reconcile"
            );
            Ok(true)
        }
        _ => Ok(false),
    }
}
