//! Action scopes.

use super::parameters::keys;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity an action addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    /// One cell: a column of a single row.
    Cell,
    /// Every cell of one column.
    Column,
    /// One row.
    Line,
    /// The whole dataset.
    Table,
}

impl Scope {
    /// All scopes, in declaration order.
    pub const ALL: [Scope; 4] = [Scope::Cell, Scope::Column, Scope::Line, Scope::Table];

    /// Parse a scope value, ignoring case. `dataset` is accepted for TABLE.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cell" => Some(Self::Cell),
            "column" => Some(Self::Column),
            "line" => Some(Self::Line),
            "table" | "dataset" => Some(Self::Table),
            _ => None,
        }
    }

    /// Parameter keys an action created with this scope must receive.
    pub fn required_parameters(self) -> &'static [&'static str] {
        match self {
            Self::Cell => &[keys::ROW_ID, keys::COLUMN_ID],
            Self::Column => &[keys::COLUMN_ID],
            Self::Line => &[keys::ROW_ID],
            Self::Table => &[],
        }
    }

    /// Upper-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cell => "CELL",
            Self::Column => "COLUMN",
            Self::Line => "LINE",
            Self::Table => "TABLE",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Scope::parse("column"), Some(Scope::Column));
        assert_eq!(Scope::parse("LINE"), Some(Scope::Line));
        assert_eq!(Scope::parse(" Cell "), Some(Scope::Cell));
        assert_eq!(Scope::parse("dataset"), Some(Scope::Table));
        assert_eq!(Scope::parse("row"), None);
    }

    #[test]
    fn required_parameters_per_scope() {
        assert_eq!(Scope::Cell.required_parameters(), ["row_id", "column_id"]);
        assert_eq!(Scope::Column.required_parameters(), ["column_id"]);
        assert_eq!(Scope::Line.required_parameters(), ["row_id"]);
        assert!(Scope::Table.required_parameters().is_empty());
    }
}
