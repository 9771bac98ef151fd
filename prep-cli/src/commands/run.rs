//! Run command - apply a script to a dataset.

use super::read_script;
use crate::dataset::Dataset;
use anyhow::{Context, Result};
use prep_executor::writer::{JsonWriter, Writer};
use prep_executor::{ExecutionSummary, Pipeline};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

/// Arguments of the run command.
pub struct RunOptions<'a> {
    pub script: &'a Path,
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub limit: Option<u64>,
    pub pretty: bool,
}

/// Run the run command.
pub fn run(options: RunOptions<'_>) -> Result<()> {
    let to_stdout = options.output.is_none();
    let summary = execute(&options)?;

    // stdout carries the dataset itself when no output file is given
    if to_stdout {
        println!();
        return Ok(());
    }

    println!("Execution {}", summary.execution_id);
    println!("  Rows read:    {}", summary.rows_in);
    println!("  Rows written: {}", summary.rows_out);
    println!("  Rows deleted: {}", summary.deleted);
    if summary.stopped {
        println!("  Stopped early by the row limit");
    }
    for (position, status) in summary.statuses.iter().enumerate() {
        println!("  Action {position}: {status}");
    }
    Ok(())
}

/// Build and execute the pipeline described by `options`.
pub fn execute(options: &RunOptions<'_>) -> Result<ExecutionSummary> {
    let script = read_script(options.script)?;
    let dataset = Dataset::from_file(options.input)?;

    let writer: Box<dyn Writer> = match options.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(JsonWriter::new(BufWriter::new(file)).pretty(options.pretty))
        }
        None => Box::new(JsonWriter::new(io::stdout()).pretty(options.pretty)),
    };

    let mut builder = Pipeline::builder()
        .schema(dataset.schema)
        .registry(prep_actions::standard_registry())
        .actions(script.actions)
        .writer(writer);
    if let Some(limit) = options.limit {
        builder = builder.limit(limit);
    }

    tracing::info!(
        script = %options.script.display(),
        input = %options.input.display(),
        rows = dataset.rows.len(),
        "Running script"
    );
    let summary = builder.build()?.execute(dataset.rows)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::action::ActionStatus;
    use std::fs;
    use tempfile::TempDir;

    const DATASET: &str = r#"{
        "metadata": {"columns": [{"id": "0000", "name": "name"}, {"id": "0001", "name": "city"}]},
        "records": [
            {"0000": "ada", "0001": "london"},
            {"0000": "", "0001": " "},
            {"0000": "alan", "0001": "wilmslow"}
        ]
    }"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn writes_transformed_dataset() {
        let dir = TempDir::new().unwrap();
        let script = write(
            &dir,
            "script.json",
            r#"{"actions": [
                {"action": "delete_empty_rows", "parameters": {"scope": "table"}},
                {"action": "uppercase", "parameters": {"scope": "column", "column_id": "0001"}}
            ]}"#,
        );
        let input = write(&dir, "input.json", DATASET);
        let output = dir.path().join("output.json");

        let summary = execute(&RunOptions {
            script: &script,
            input: &input,
            output: Some(&output),
            limit: None,
            pretty: false,
        })
        .unwrap();

        assert_eq!((summary.rows_in, summary.rows_out, summary.deleted), (3, 2, 1));
        assert_eq!(summary.statuses, [ActionStatus::Ok, ActionStatus::Ok]);

        // the output is a valid dataset again
        let again = Dataset::from_file(&output).unwrap();
        let cities: Vec<_> = again.rows.iter().map(|r| r.get("0001")).collect();
        assert_eq!(cities, [Some("LONDON"), Some("WILMSLOW")]);
        assert_eq!(again.rows[1].id(), Some(3));
    }

    #[test]
    fn limit_stops_early() {
        let dir = TempDir::new().unwrap();
        let script = write(&dir, "script.json", r#"{"actions": []}"#);
        let input = write(&dir, "input.json", DATASET);
        let output = dir.path().join("output.json");

        let summary = execute(&RunOptions {
            script: &script,
            input: &input,
            output: Some(&output),
            limit: Some(1),
            pretty: true,
        })
        .unwrap();

        assert!(summary.stopped);
        assert_eq!(summary.rows_out, 1);
    }

    #[test]
    fn unknown_action_fails() {
        let dir = TempDir::new().unwrap();
        let script = write(&dir, "script.json", r#"{"actions": [{"action": "explode"}]}"#);
        let input = write(&dir, "input.json", DATASET);

        let err = execute(&RunOptions {
            script: &script,
            input: &input,
            output: Some(&dir.path().join("output.json")),
            limit: None,
            pretty: false,
        })
        .unwrap_err();

        assert!(err.to_string().starts_with("E401"));
    }
}
