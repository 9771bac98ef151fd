//! Single row deletion.

use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::Result;
use prep_core::row::Row;

/// `delete_single_line`: flags the row with `row_id` as deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteSingleLine;

impl ActionDefinition for DeleteSingleLine {
    fn name(&self) -> &'static str {
        "delete_single_line"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Lines
    }

    fn description(&self) -> &'static str {
        "Deletes one row"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        scope == Scope::Line
    }

    fn apply_on_line(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        row.set_deleted(true);
        // row ids are unique, nothing left to do
        context.mark_done();
        Ok(())
    }
}
