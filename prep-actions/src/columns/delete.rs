//! Column removal.

use crate::support::target_column;
use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::Result;
use prep_core::row::Row;

/// `delete_column`: removes a column from the schema and from every row.
///
/// Canceled at compile when the column does not exist (anymore).
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteColumn;

impl ActionDefinition for DeleteColumn {
    fn name(&self) -> &'static str {
        "delete_column"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Columns
    }

    fn description(&self) -> &'static str {
        "Deletes a column"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        scope == Scope::Column
    }

    fn compile(&self, context: &mut ActionContext) -> Result<()> {
        let column = target_column(context)?;
        if context.output_schema_mut().remove(column.as_str()).is_none() {
            tracing::debug!(column = %column, "Column to delete is gone");
            context.cancel();
        }
        Ok(())
    }

    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let column = target_column(context)?;
        row.remove(column.as_str());
        Ok(())
    }
}
