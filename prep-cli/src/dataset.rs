//! Dataset files.
//!
//! Same layout as the JSON output, so a result can be fed back in:
//! `{"metadata":{"columns":[...]},"records":[{"0000":"...","tdpId":1}]}`.

use anyhow::{Context, Result};
use prep_core::row::{Row, Schema};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

const ROW_ID: &str = "tdpId";

#[derive(Debug, Deserialize)]
struct DatasetFile {
    metadata: Schema,
    #[serde(default)]
    records: Vec<Map<String, Value>>,
}

/// A schema and its rows.
#[derive(Debug)]
pub struct Dataset {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Parse a dataset document.
    ///
    /// Records without `tdpId` are numbered by position, starting at 1.
    /// Values that are not strings keep their JSON text; nulls are absent.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DatasetFile = serde_json::from_str(json).context("Invalid dataset")?;
        let schema = file.metadata;
        let rows = file
            .records
            .into_iter()
            .zip(1u64..)
            .map(|(record, position)| to_row(&schema, record, position))
            .collect();
        Ok(Self { schema, rows })
    }

    /// Read a dataset file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let dataset = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            columns = dataset.schema.len(),
            rows = dataset.rows.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }
}

fn to_row(schema: &Schema, record: Map<String, Value>, position: u64) -> Row {
    let id = record.get(ROW_ID).and_then(Value::as_u64).unwrap_or(position);
    record
        .into_iter()
        .filter(|(key, _)| key != ROW_ID)
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((key, text)),
            other => Some((key, other.to_string())),
        })
        .fold(Row::new(schema.clone()).with_id(id), |row, (key, value)| {
            row.with_value(key, value)
        })
}
