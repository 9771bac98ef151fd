//! CLI command implementations.

pub mod actions;
pub mod history;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use prep_core::action::ActionScript;
use std::path::Path;

/// Read an action script file.
fn read_script(path: &Path) -> Result<ActionScript> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let script = ActionScript::from_json(&json)?;
    tracing::debug!(path = %path.display(), actions = script.actions.len(), "Loaded script");
    Ok(script)
}
