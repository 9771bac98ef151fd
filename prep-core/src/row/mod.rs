//! Row and schema model.
//!
//! A [`Row`] maps column ids to string values and carries the [`Schema`] it
//! was produced under. Deletion is a flag: rows are never physically removed
//! while they flow, consumers filter on [`Row::is_deleted`].

mod column;
mod schema;

pub use column::{Column, ColumnId, ColumnType, Quality};
pub use schema::Schema;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single row of a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    id: Option<u64>,
    values: BTreeMap<ColumnId, String>,
    deleted: bool,
    schema: Schema,
}

impl Row {
    /// Create an empty row bound to a schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Set the row id.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set a value.
    #[must_use]
    pub fn with_value(mut self, column: impl Into<ColumnId>, value: impl Into<String>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Row id, if the source assigned one.
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Value of a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Set the value of a column.
    pub fn set(&mut self, column: impl Into<ColumnId>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Remove the value of a column.
    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.values.remove(column)
    }

    /// All values keyed by column id.
    pub fn values(&self) -> &BTreeMap<ColumnId, String> {
        &self.values
    }

    /// Values in schema column order; missing values are empty.
    pub fn ordered_values(&self) -> Vec<&str> {
        self.schema
            .ids()
            .map(|id| self.get(id.as_str()).unwrap_or(""))
            .collect()
    }

    /// Whether the row is flagged deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Flag or unflag the row as deleted.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    /// Whether a writer should output this row.
    pub fn should_write(&self) -> bool {
        !self.deleted
    }

    /// Whether every schema column is blank for this row.
    pub fn is_blank(&self) -> bool {
        self.schema
            .ids()
            .all(|id| self.get(id.as_str()).is_none_or(|v| v.trim().is_empty()))
    }

    /// Schema the row is currently attached to.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Attach the row to another schema.
    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = schema;
    }

    /// Compare this row with its previous version.
    pub fn diff(&self, old: &Row) -> RowDiff {
        let mut changed = BTreeSet::new();
        for (id, value) in &self.values {
            if old.values.get(id) != Some(value) {
                changed.insert(id.clone());
            }
        }
        for id in old.values.keys() {
            if !self.values.contains_key(id) {
                changed.insert(id.clone());
            }
        }

        let flag = match (old.deleted, self.deleted) {
            (true, false) => Some(DiffFlag::New),
            (false, true) => Some(DiffFlag::Delete),
            (true, true) => None,
            (false, false) if !changed.is_empty() => Some(DiffFlag::Update),
            (false, false) => None,
        };

        RowDiff {
            row_id: self.id,
            flag,
            changed,
        }
    }
}

/// Kind of change between two versions of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiffFlag {
    /// Absent (or deleted) before, present now.
    New,
    /// Present before and now, with different values.
    Update,
    /// Present before, deleted now.
    Delete,
}

/// Result of comparing two versions of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiff {
    /// Id of the compared row.
    pub row_id: Option<u64>,
    /// Change kind, `None` when both versions are equal.
    pub flag: Option<DiffFlag>,
    /// Columns whose value differs.
    pub changed: BTreeSet<ColumnId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(vec![Column::new("0000", "a"), Column::new("0001", "b")])
    }

    #[test]
    fn row_values() {
        let mut row = Row::new(schema()).with_id(3).with_value("0000", "x");
        assert_eq!(row.id(), Some(3));
        assert_eq!(row.get("0000"), Some("x"));
        assert_eq!(row.ordered_values(), ["x", ""]);

        row.set("0001", "y");
        assert_eq!(row.remove("0000").as_deref(), Some("x"));
        assert_eq!(row.ordered_values(), ["", "y"]);
    }

    #[test]
    fn blank_rows() {
        assert!(Row::new(schema()).is_blank());
        assert!(Row::new(schema()).with_value("0000", "  ").is_blank());
        assert!(!Row::new(schema()).with_value("0001", "v").is_blank());
    }

    #[test]
    fn clone_is_independent() {
        let original = Row::new(schema()).with_value("0000", "x");
        let mut copy = original.clone();
        copy.set("0000", "changed");
        copy.set_deleted(true);
        assert_eq!(original.get("0000"), Some("x"));
        assert!(!original.is_deleted());
    }

    #[test]
    fn diff_flags() {
        let old = Row::new(schema()).with_id(1).with_value("0000", "x");

        let same = old.clone();
        assert_eq!(same.diff(&old).flag, None);

        let updated = old.clone().with_value("0001", "y");
        let diff = updated.diff(&old);
        assert_eq!(diff.flag, Some(DiffFlag::Update));
        assert!(diff.changed.contains("0001"));

        let mut deleted = old.clone();
        deleted.set_deleted(true);
        assert_eq!(deleted.diff(&old).flag, Some(DiffFlag::Delete));
        assert_eq!(old.diff(&deleted).flag, Some(DiffFlag::New));
    }
}
