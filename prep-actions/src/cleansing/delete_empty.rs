//! Deleting blank rows.

use crate::support::target_column;
use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::Result;
use prep_core::row::Row;

/// `delete_empty_rows`: flags blank rows as deleted.
///
/// With TABLE scope a row is blank when every column is blank; with COLUMN
/// scope when the target cell is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteEmptyRows;

impl ActionDefinition for DeleteEmptyRows {
    fn name(&self) -> &'static str {
        "delete_empty_rows"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::DataCleansing
    }

    fn description(&self) -> &'static str {
        "Deletes rows with no value"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        matches!(scope, Scope::Table | Scope::Column)
    }

    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let column = target_column(context)?;
        if row.get(column.as_str()).is_none_or(|v| v.trim().is_empty()) {
            row.set_deleted(true);
        }
        Ok(())
    }

    fn apply_on_dataset(&self, row: &mut Row, _context: &mut ActionContext) -> Result<()> {
        if row.is_blank() {
            row.set_deleted(true);
        }
        Ok(())
    }
}
