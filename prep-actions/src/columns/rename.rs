//! Column renaming.

use crate::support::target_column;
use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::Result;
use prep_core::row::Row;

/// New name of the column.
pub const NEW_COLUMN_NAME: &str = "new_column_name";

/// `rename_column`: a one-shot schema edit, done at compile.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameColumn;

impl ActionDefinition for RenameColumn {
    fn name(&self) -> &'static str {
        "rename_column"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Columns
    }

    fn description(&self) -> &'static str {
        "Renames a column"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        scope == Scope::Column
    }

    fn compile(&self, context: &mut ActionContext) -> Result<()> {
        let column = target_column(context)?;
        let name = context.require(NEW_COLUMN_NAME)?.to_string();
        if context.output_schema_mut().rename(column.as_str(), name) {
            context.mark_done();
        } else {
            context.cancel();
        }
        Ok(())
    }

    fn apply_on_column(&self, _row: &mut Row, _context: &mut ActionContext) -> Result<()> {
        Ok(())
    }
}
