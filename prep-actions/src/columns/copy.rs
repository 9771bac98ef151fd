//! Column duplication.

use crate::support::target_column;
use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, NewColumn, Scope};
use prep_core::error::Result;
use prep_core::row::{ColumnId, Row};

/// Id of the created copy, kept between compile and apply.
struct CopyTarget(ColumnId);

/// `copy`: duplicates a column into `<name>_copy`, placed right after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyColumn;

impl ActionDefinition for CopyColumn {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Columns
    }

    fn description(&self) -> &'static str {
        "Duplicates a column"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        scope == Scope::Column
    }

    fn compile(&self, context: &mut ActionContext) -> Result<()> {
        let source = target_column(context)?;
        let Some(column) = context.input_schema().column(source.as_str()).cloned() else {
            tracing::debug!(column = %source, "Column to copy is gone");
            context.cancel();
            return Ok(());
        };
        let name = format!("{}_copy", column.name);
        let id = context.column(&name, |_| {
            NewColumn::named(name.clone())
                .of_type(column.column_type)
                .after(column.id.clone())
        });
        context.set_state(CopyTarget(id));
        Ok(())
    }

    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let source = target_column(context)?;
        let Some(CopyTarget(target)) = context.state::<CopyTarget>() else {
            return Ok(());
        };
        let value = row.get(source.as_str()).unwrap_or_default().to_string();
        row.set(target.clone(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{row, run, schema};
    use prep_core::action::ActionStatus;

    #[test]
    fn copies_values_and_inserts_column_after_source() {
        let schema = schema(&["recipe", "steps", "last update"]);
        let mut rows = vec![row(&schema, 1, &["lorem bacon", "Bacon ipsum", "01/01/2015"])];

        let (status, output) = run(CopyColumn, &[("scope", "column"), ("column_id", "0001")], &mut rows);

        assert_eq!(status, ActionStatus::Ok);
        let names: Vec<_> = output.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["recipe", "steps", "steps_copy", "last update"]);
        assert_eq!(output.by_name("steps_copy").map(|c| c.id.as_str()), Some("0003"));
        assert_eq!(rows[0].get("0003"), Some("Bacon ipsum"));
        assert_eq!(rows[0].get("0001"), Some("Bacon ipsum"));
    }

    #[test]
    fn missing_source_cancels() {
        let schema = schema(&["a"]);
        let mut rows = vec![row(&schema, 1, &["x"])];

        let (status, output) = run(CopyColumn, &[("scope", "column"), ("column_id", "0009")], &mut rows);

        assert_eq!(status, ActionStatus::Canceled);
        assert_eq!(output.len(), 1);
    }
}
