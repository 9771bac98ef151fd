//! Filling blank cells.

use crate::support::target_column;
use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::Result;
use prep_core::row::Row;

/// Value written into blank cells.
pub const VALUE: &str = "value";

/// `fill_empty_with_value`: writes a constant into blank cells.
///
/// A cell is blank when it is missing or holds only whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillEmptyWithValue;

impl ActionDefinition for FillEmptyWithValue {
    fn name(&self) -> &'static str {
        "fill_empty_with_value"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::DataCleansing
    }

    fn description(&self) -> &'static str {
        "Fills empty cells with a value"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        matches!(scope, Scope::Cell | Scope::Column)
    }

    fn compile(&self, context: &mut ActionContext) -> Result<()> {
        context.require(VALUE).map(|_| ())
    }

    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let column = target_column(context)?;
        if row.get(column.as_str()).is_none_or(|v| v.trim().is_empty()) {
            row.set(column, context.require(VALUE)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{row, run, schema};

    #[test]
    fn fills_blank_and_missing_cells() {
        let schema = schema(&["a", "b"]);
        let mut rows = vec![
            row(&schema, 1, &["x", ""]),
            row(&schema, 2, &["y", "  "]),
            row(&schema, 3, &["z"]),
            row(&schema, 4, &["w", "kept"]),
        ];

        run(
            FillEmptyWithValue,
            &[("scope", "column"), ("column_id", "0001"), (VALUE, "n/a")],
            &mut rows,
        );

        let values: Vec<_> = rows.iter().map(|r| r.get("0001")).collect();
        assert_eq!(values, [Some("n/a"), Some("n/a"), Some("n/a"), Some("kept")]);
    }

    #[test]
    fn missing_value_parameter_fails_compile() {
        use prep_core::action::{ActionFactory, Parameters};
        use std::sync::Arc;

        let parameters = Parameters::new().with("scope", "column").with("column_id", "0000");
        let runtime = ActionFactory::create(Arc::new(FillEmptyWithValue), &parameters).unwrap();
        let mut context = ActionContext::for_runtime(&runtime, 0);

        let err = runtime.compile(&mut context).unwrap_err();
        assert_eq!(err.code(), "E202");
    }
}
