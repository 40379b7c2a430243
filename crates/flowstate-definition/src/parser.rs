//! Parse definition files (TOML and JSON) and resolve definition paths.

use std::path::{Path, PathBuf};

use crate::types::{DefinitionError, FlowFile};

/// Suffixes tried, in order, when a definition is looked up by name.
const SUFFIXES: &[&str] = &[".flow.toml", ".flow.json", ".toml", ".json"];

/// Parse a definition from a TOML string.
pub fn parse_toml(content: &str) -> Result<FlowFile, DefinitionError> {
    toml::from_str(content).map_err(|e| DefinitionError::Parse(e.to_string()))
}

/// Parse a definition from a JSON string.
pub fn parse_json(content: &str) -> Result<FlowFile, DefinitionError> {
    serde_json::from_str(content).map_err(|e| DefinitionError::Parse(e.to_string()))
}

/// Load a definition from a file path (auto-detect TOML vs JSON by extension).
pub fn load_definition(path: &Path) -> Result<FlowFile, DefinitionError> {
    let content = std::fs::read_to_string(path)?;
    let mut file = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml(&content)?,
        Some("json") => parse_json(&content)?,
        _ => {
            // Try JSON first, then TOML
            parse_json(&content).or_else(|_| parse_toml(&content))?
        }
    };
    file.source = path.display().to_string();
    Ok(file)
}

/// Search for a definition by name or path.
///
/// Search order:
/// 1. Exact path (absolute, or relative to each search dir)
/// 2. Each search dir with the standard suffixes
pub fn find_definition(name: &str, search_dirs: &[&Path]) -> Result<PathBuf, DefinitionError> {
    let exact = Path::new(name);
    if exact.is_absolute() {
        if exact.is_file() {
            return Ok(exact.to_path_buf());
        }
        return Err(DefinitionError::NotFound(name.to_string()));
    }

    for dir in search_dirs {
        let relative = dir.join(name);
        if relative.is_file() {
            return Ok(relative);
        }
    }

    for dir in search_dirs {
        for suffix in SUFFIXES {
            let candidate = dir.join(format!("{}{}", name, suffix));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(DefinitionError::NotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_json_minimal() {
        let json = r#"{"flow": "test", "steps": [{"id": "a"}]}"#;
        let f = parse_json(json).unwrap();
        assert_eq!(f.flow, "test");
        assert_eq!(f.steps.len(), 1);
        assert_eq!(f.steps[0].id, "a");
        assert!(f.steps[0].needs.is_empty());
        assert!(f.steps[0].automation.is_none());
        assert_eq!(f.version, 0);
    }

    #[test]
    fn parse_toml_with_automation() {
        let toml_str = r#"
flow = "renovation"
description = "Renovation grant file"
version = 1

[[steps]]
id = "budget_base"
title = "Base budget"

[[steps]]
id = "measurement"
needs = ["budget_base"]

[[steps]]
id = "certificate"
needs = ["measurement"]
automation = { job = "generate_certificate" }
"#;
        let f = parse_toml(toml_str).unwrap();
        assert_eq!(f.flow, "renovation");
        assert_eq!(f.version, 1);
        assert_eq!(f.steps.len(), 3);
        assert_eq!(f.steps[0].title, "Base budget");
        assert_eq!(f.steps[2].needs, vec!["measurement"]);
        assert_eq!(
            f.steps[2].automation.as_ref().map(|a| a.job.as_str()),
            Some("generate_certificate")
        );
    }

    #[test]
    fn parse_error_is_reported() {
        let err = parse_toml("flow = ").unwrap_err();
        assert!(matches!(err, DefinitionError::Parse(_)));
    }

    #[test]
    fn load_sets_source_and_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake");
        std::fs::write(&path, r#"{"flow": "intake", "steps": [{"id": "a"}]}"#).unwrap();

        let f = load_definition(&path).unwrap();
        assert_eq!(f.flow, "intake");
        assert_eq!(f.source, path.display().to_string());
    }

    #[test]
    fn find_by_name_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renovation.flow.toml");
        std::fs::write(&path, "flow = \"renovation\"\n").unwrap();

        let found = find_definition("renovation", &[dir.path()]).unwrap();
        assert_eq!(found, path);

        let exact = find_definition("renovation.flow.toml", &[dir.path()]).unwrap();
        assert_eq!(exact, path);
    }

    #[test]
    fn find_missing_definition() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_definition("nope", &[dir.path()]).unwrap_err();
        assert!(matches!(err, DefinitionError::NotFound(ref n) if n == "nope"));
    }
}
