//! Promoting a row to header.

use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::Result;
use prep_core::row::Row;

/// `make_line_header`: uses the values of row `row_id` as column names and
/// deletes that row.
///
/// Rows before the header keep the old names on their own schema; the final
/// schema handed to writers carries the new ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeLineHeader;

impl ActionDefinition for MakeLineHeader {
    fn name(&self) -> &'static str {
        "make_line_header"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::DataCleansing
    }

    fn description(&self) -> &'static str {
        "Uses a row as the header"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        scope == Scope::Line
    }

    fn apply_on_line(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let names: Vec<(String, String)> = context
            .output_schema()
            .columns()
            .iter()
            .filter_map(|column| {
                let value = row.get(column.id.as_str())?.trim();
                (!value.is_empty()).then(|| (column.id.to_string(), value.to_string()))
            })
            .collect();

        let schema = context.output_schema_mut();
        for (id, name) in names {
            schema.rename(&id, name);
        }
        row.set_deleted(true);
        context.mark_done();
        tracing::debug!(row = ?row.id(), "Row promoted to header");
        Ok(())
    }
}
