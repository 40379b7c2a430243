//! Configuration types and loading for the flowstate system.
//!
//! [`FlowConfig`] mirrors `.flowstate/config.yaml`. It is loaded with
//! [`load_config`], which layers `FLOWSTATE_*` environment variables over
//! the file, and written with [`save_config`].

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file inside `.flowstate/`.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "FLOWSTATE_";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration could not be serialized as YAML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Merging the file with environment overrides failed.
    #[error("invalid configuration: {0}")]
    Figment(#[from] figment::Error),

    /// The `.flowstate/` directory was not found.
    #[error("no .flowstate directory found (run 'flowctl init' first)")]
    FlowDirNotFound,

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Contents of `.flowstate/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Flow definition file. Relative paths are resolved against the
    /// project root (the parent of `.flowstate/`).
    #[serde(default = "default_definition")]
    pub definition: String,

    /// SQLite database file. Relative paths are resolved against
    /// `.flowstate/` itself.
    #[serde(default = "default_database")]
    pub database: String,

    /// Emit JSON instead of human-readable output by default.
    #[serde(default)]
    pub json: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            definition: default_definition(),
            database: default_database(),
            json: false,
        }
    }
}

fn default_definition() -> String {
    "flow.toml".to_string()
}

fn default_database() -> String {
    "flowstate.db".to_string()
}

impl FlowConfig {
    /// Absolute location of the definition file for a given `.flowstate/`.
    pub fn definition_path(&self, flow_dir: &Path) -> PathBuf {
        let root = flow_dir.parent().unwrap_or(flow_dir);
        resolve_against(root, &self.definition)
    }

    /// Absolute location of the database for a given `.flowstate/`.
    pub fn database_path(&self, flow_dir: &Path) -> PathBuf {
        resolve_against(flow_dir, &self.database)
    }

    /// Reject values that cannot name a file.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("definition", &self.definition), ("database", &self.database)] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn resolve_against(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// The layered configuration sources for a `.flowstate/` directory:
/// defaults, then `config.yaml`, then `FLOWSTATE_*` variables.
pub fn figment(flow_dir: &Path) -> Figment {
    Figment::from(Serialized::defaults(FlowConfig::default()))
        .merge(Yaml::file(flow_dir.join(CONFIG_FILE_NAME)))
        .merge(Env::prefixed(ENV_PREFIX).only(&["definition", "database", "json"]))
}

/// Load configuration for the given `.flowstate/` directory.
///
/// A missing `config.yaml` yields the defaults (plus any environment
/// overrides).
///
/// # Errors
///
/// Returns [`ConfigError::Figment`] if the file is malformed or a value has
/// the wrong type, or [`ConfigError::InvalidValue`] for empty paths.
pub fn load_config(flow_dir: &Path) -> Result<FlowConfig> {
    let config: FlowConfig = figment(flow_dir).extract()?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to `config.yaml` inside the given `.flowstate/`
/// directory, creating the directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] on I/O failure or
/// [`ConfigError::ParseError`] if serialization fails.
pub fn save_config(flow_dir: &Path, config: &FlowConfig) -> Result<()> {
    std::fs::create_dir_all(flow_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(flow_dir.join(CONFIG_FILE_NAME), yaml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let cfg = FlowConfig::default();
        assert_eq!(cfg.definition, "flow.toml");
        assert_eq!(cfg.database, "flowstate.db");
        assert!(!cfg.json);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let flow_dir = dir.path().join(".flowstate");
        let cfg: FlowConfig = Figment::from(Serialized::defaults(FlowConfig::default()))
            .merge(Yaml::file(flow_dir.join(CONFIG_FILE_NAME)))
            .extract()
            .unwrap();
        assert_eq!(cfg, FlowConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let flow_dir = dir.path().join(".flowstate");
        let cfg = FlowConfig {
            definition: "flows/grant.flow.toml".to_string(),
            database: "state.db".to_string(),
            json: true,
        };
        save_config(&flow_dir, &cfg).unwrap();
        assert!(flow_dir.join(CONFIG_FILE_NAME).is_file());

        let loaded: FlowConfig = Figment::new()
            .merge(Yaml::file(flow_dir.join(CONFIG_FILE_NAME)))
            .extract()
            .unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: FlowConfig = serde_yaml::from_str("json: true\n").unwrap();
        assert!(cfg.json);
        assert_eq!(cfg.definition, "flow.toml");
        assert_eq!(cfg.database, "flowstate.db");
    }

    #[test]
    fn malformed_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "json: [1, 2]\n").unwrap();
        let err = Figment::from(Serialized::defaults(FlowConfig::default()))
            .merge(Yaml::file(dir.path().join(CONFIG_FILE_NAME)))
            .extract::<FlowConfig>()
            .map_err(ConfigError::from)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
    }

    #[test]
    fn empty_path_is_rejected() {
        let cfg = FlowConfig {
            database: "  ".to_string(),
            ..FlowConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "database"
        ));
    }

    #[test]
    fn paths_resolve_relative_to_their_base() {
        let cfg = FlowConfig::default();
        let flow_dir = Path::new("/srv/grants/.flowstate");
        assert_eq!(cfg.definition_path(flow_dir), PathBuf::from("/srv/grants/flow.toml"));
        assert_eq!(
            cfg.database_path(flow_dir),
            PathBuf::from("/srv/grants/.flowstate/flowstate.db")
        );

        let abs = FlowConfig {
            definition: "/etc/flows/main.toml".to_string(),
            ..FlowConfig::default()
        };
        assert_eq!(abs.definition_path(flow_dir), PathBuf::from("/etc/flows/main.toml"));
    }
}
