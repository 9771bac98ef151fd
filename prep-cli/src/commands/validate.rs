//! Validate command - check a script against the built-in actions.

use super::read_script;
use anyhow::Result;
use prep_core::action::{ActionRegistry, ActionScript};
use std::path::Path;

/// Outcome of validating one action.
#[derive(Debug)]
pub struct Check {
    pub position: usize,
    pub action: String,
    pub result: std::result::Result<String, String>,
}

/// Run the validate command.
pub fn run(script: &Path) -> Result<()> {
    let file = script.display().to_string();
    tracing::info!(file = %file, "Validating script");

    println!("Validation Results for: {}", file);
    println!("========================{}", "=".repeat(file.len()));
    println!();

    let script = read_script(script)?;
    println!("✓ JSON syntax is valid");
    println!();

    let checks = check(&prep_actions::standard_registry(), &script);
    let failures = checks.iter().filter(|c| c.result.is_err()).count();
    for check in &checks {
        match &check.result {
            Ok(scope) => println!("✓ {}: {} ({})", check.position, check.action, scope),
            Err(error) => println!("✗ {}: {}\n    {}", check.position, check.action, error),
        }
    }
    println!();

    if failures > 0 {
        anyhow::bail!("{failures} of {} actions are invalid", checks.len());
    }
    println!("Script is valid ({} actions)", checks.len());
    Ok(())
}

/// Resolve each action on its own so every problem is reported.
pub fn check(registry: &ActionRegistry, script: &ActionScript) -> Vec<Check> {
    script
        .actions
        .iter()
        .enumerate()
        .map(|(position, action)| Check {
            position,
            action: action.name.clone(),
            result: registry
                .create(action)
                .map(|runtime| runtime.scope().to_string())
                .map_err(|e| e.to_string()),
        })
        .collect()
}
