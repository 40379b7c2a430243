//! `flowctl init` -- create the `.flowstate/` directory.

use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;

use flowstate_config::config::CONFIG_FILE_NAME;
use flowstate_config::{FlowConfig, ensure_flow_dir, save_config};
use flowstate_storage::SqliteStore;

use crate::cli::InitArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

const GITIGNORE_CONTENT: &str = "# flowstate database files\n*.db\n*.db-journal\n*.db-wal\n*.db-shm\n";

/// Definition written by `--example`.
const EXAMPLE_DEFINITION: &str = r#"flow = "renovation"
description = "Renovation grant file"
version = 1

[[steps]]
id = "project_intake"
title = "Project intake"

[[steps]]
id = "budget_base"
title = "Base budget"
needs = ["project_intake"]

[[steps]]
id = "measurement"
title = "On-site measurement"
needs = ["budget_base"]

[[steps]]
id = "certificate"
title = "Energy certificate"
needs = ["measurement"]
automation = { job = "generate_certificate" }
"#;

/// Execute the `flowctl init` command.
pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let base = ctx.base_dir()?;
    let flow_dir = ensure_flow_dir(&base)
        .with_context(|| format!("failed to create .flowstate in {}", base.display()))?;

    let config_path = flow_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists\n\n\
             This directory is already initialized. Use --force to rewrite the config.",
            config_path.display()
        );
    }

    let mut config = FlowConfig::default();
    if let Some(definition) = &ctx.definition {
        config.definition = definition.clone();
    }
    save_config(&flow_dir, &config)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    let gitignore_path = flow_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE_CONTENT).with_context(|| {
            format!("failed to create .gitignore: {}", gitignore_path.display())
        })?;
    }

    let db_path = config.database_path(&flow_dir);
    SqliteStore::open(&db_path)
        .with_context(|| format!("failed to create database {}", db_path.display()))?;

    let definition_path = config.definition_path(&flow_dir);
    let mut wrote_example = false;
    if args.example && !definition_path.exists() {
        fs::write(&definition_path, EXAMPLE_DEFINITION).with_context(|| {
            format!("failed to write {}", definition_path.display())
        })?;
        wrote_example = true;
    }

    info!(dir = %flow_dir.display(), "initialized flowstate directory");

    if ctx.json {
        output_json(&serde_json::json!({
            "flow_dir": flow_dir.display().to_string(),
            "config": config_path.display().to_string(),
            "database": db_path.display().to_string(),
            "definition": definition_path.display().to_string(),
            "example_written": wrote_example,
        }));
    } else if !ctx.quiet {
        println!("Initialized {}", flow_dir.display());
        println!("  Config:     {}", config_path.display());
        println!("  Database:   {}", db_path.display());
        println!("  Definition: {}", definition_path.display());
        if wrote_example {
            println!();
            println!("Wrote an example flow. Try `flowctl validate`.");
        } else if !definition_path.exists() {
            println!();
            println!("Create the flow definition, then run `flowctl validate`.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_definition::parser::parse_toml;
    use flowstate_definition::resolve;
    use pretty_assertions::assert_eq;

    #[test]
    fn example_definition_resolves() {
        let file = parse_toml(EXAMPLE_DEFINITION).unwrap();
        let definition = resolve(&file).unwrap();
        assert_eq!(
            definition.topological_ids(),
            vec!["project_intake", "budget_base", "measurement", "certificate"]
        );
        assert_eq!(
            definition.get("certificate").and_then(|s| s.job_type()),
            Some("generate_certificate")
        );
    }
}
