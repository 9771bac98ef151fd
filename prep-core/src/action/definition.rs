//! The contract every concrete action implements.

use super::context::ActionContext;
use super::scope::Scope;
use crate::error::{PrepError, Result};
use crate::row::{Column, Row};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Family an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    /// Letter case changes.
    Case,
    /// Column structure changes (copy, rename, delete).
    Columns,
    /// Line level operations.
    Lines,
    /// Removal or repair of bad values.
    DataCleansing,
    /// Text edits.
    Strings,
}

impl ActionCategory {
    /// Get the category name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Columns => "columns",
            Self::Lines => "lines",
            Self::DataCleansing => "data_cleansing",
            Self::Strings => "strings",
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named row/schema transformation.
///
/// Definitions are stateless and shared: everything an action needs to
/// remember during one execution lives in its [`ActionContext`].
///
/// `compile` runs exactly once per execution, before the first `apply`.
/// Which `apply_on_*` method is called depends on the scope the action was
/// created with:
///
/// | Scope  | Method             | Rows                        |
/// |--------|--------------------|-----------------------------|
/// | CELL   | `apply_on_column`  | only the row with `row_id`  |
/// | COLUMN | `apply_on_column`  | every row                   |
/// | LINE   | `apply_on_line`    | only the row with `row_id`  |
/// | TABLE  | `apply_on_dataset` | every row                   |
///
/// Schema changes go through the context (`column`, `output_schema_mut`);
/// the executor attaches the context's output schema to each row.
pub trait ActionDefinition: Send + Sync {
    /// Unique name, used in action scripts.
    fn name(&self) -> &'static str;

    /// Category of the action.
    fn category(&self) -> ActionCategory;

    /// Short human readable description.
    fn description(&self) -> &'static str {
        ""
    }

    /// Whether the action can be created with this scope.
    fn accepts_scope(&self, scope: Scope) -> bool;

    /// Whether the action makes sense on this column.
    ///
    /// Checked at compile time for CELL and COLUMN scopes; a refused column
    /// cancels the action.
    fn accepts_column(&self, column: &Column) -> bool {
        let _ = column;
        true
    }

    /// One-time preparation: schema edits, parameter parsing.
    fn compile(&self, context: &mut ActionContext) -> Result<()> {
        let _ = context;
        Ok(())
    }

    /// Apply on the target column of a row.
    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let _ = row;
        unsupported(self.name(), context.scope())
    }

    /// Apply on the target row.
    fn apply_on_line(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let _ = row;
        unsupported(self.name(), context.scope())
    }

    /// Apply on a row of the whole dataset.
    fn apply_on_dataset(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let _ = row;
        unsupported(self.name(), context.scope())
    }
}

fn unsupported(action: &str, scope: Scope) -> Result<()> {
    Err(PrepError::UnsupportedActionScope {
        action: action.to_string(),
        scope,
    })
}
