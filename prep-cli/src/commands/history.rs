//! History command - record scripts as preparation steps and replay them.

use super::read_script;
use anyhow::Result;
use prep_core::action::ActionScript;
use prep_core::preparation::{AppendStep, InMemoryRepository, PreparationService, StepId};
use std::path::PathBuf;
use std::sync::Arc;

/// Steps recorded for a preparation and the actions they replay to.
#[derive(Debug)]
pub struct History {
    pub preparation_id: String,
    pub steps: Vec<StepId>,
    pub replay: ActionScript,
}

/// Run the history command.
pub fn run(scripts: &[PathBuf], dataset: &str, app_version: &str) -> Result<()> {
    let history = record(scripts, dataset, app_version)?;

    println!("Preparation {}", history.preparation_id);
    println!();
    println!("Steps (root first):");
    for (index, step) in history.steps.iter().enumerate() {
        let label = if step.is_root() { " (root)" } else { "" };
        println!("  {index:>3}  {step}{label}");
    }
    println!();
    println!("Replayed actions:");
    println!("{}", serde_json::to_string_pretty(&history.replay)?);
    Ok(())
}

/// Append one step per script to a fresh preparation.
pub fn record(scripts: &[PathBuf], dataset: &str, app_version: &str) -> Result<History> {
    let service = PreparationService::new(Arc::new(InMemoryRepository::new()))
        .with_registry(prep_actions::standard_registry())
        .with_app_version(app_version);
    let preparation = service.create(Some(dataset), "cli", "prep")?;

    for path in scripts {
        let script = read_script(path)?;
        let step = service.append_step(&preparation.id, AppendStep::new(script.actions))?;
        tracing::info!(script = %path.display(), step = %step, "Recorded step");
    }

    Ok(History {
        steps: service.steps(&preparation.id)?,
        replay: ActionScript::new(service.actions(&preparation.id)?),
        preparation_id: preparation.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn replay_concatenates_scripts_in_order() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        fs::write(
            &first,
            r#"{"actions": [{"action": "trim", "parameters": {"scope": "column", "column_id": "0000"}}]}"#,
        )
        .unwrap();
        fs::write(
            &second,
            r#"{"actions": [
                {"action": "uppercase", "parameters": {"scope": "column", "column_id": "0000"}},
                {"action": "delete_empty_rows", "parameters": {"scope": "table"}}
            ]}"#,
        )
        .unwrap();

        let history = record(&[first, second], "ds-1", "test").unwrap();

        assert_eq!(history.steps.len(), 3);
        assert!(history.steps[0].is_root());
        let names: Vec<_> = history.replay.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["trim", "uppercase", "delete_empty_rows"]);
    }

    #[test]
    fn invalid_script_records_nothing() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("bad.json");
        fs::write(
            &script,
            r#"{"actions": [{"action": "uppercase", "parameters": {"scope": "table"}}]}"#,
        )
        .unwrap();

        let err = record(&[script], "ds-1", "test").unwrap_err();

        assert!(err.to_string().starts_with("E102"));
    }
}
