//! Whitespace trimming.

use crate::support::{is_text, target_column};
use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::Result;
use prep_core::row::{Column, Row};

/// `trim`: removes leading and trailing whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trim;

impl ActionDefinition for Trim {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Strings
    }

    fn description(&self) -> &'static str {
        "Removes leading and trailing whitespace"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        matches!(scope, Scope::Cell | Scope::Column)
    }

    fn accepts_column(&self, column: &Column) -> bool {
        is_text(column)
    }

    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let column = target_column(context)?;
        let trimmed = match row.get(column.as_str()) {
            Some(value) if value.trim().len() != value.len() => value.trim().to_string(),
            _ => return Ok(()),
        };
        row.set(column, trimmed);
        Ok(())
    }
}
