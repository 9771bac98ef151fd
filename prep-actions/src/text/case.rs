//! Case changes.

use crate::support::{is_text, target_column};
use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::Result;
use prep_core::row::{Column, Row};

fn change_case(row: &mut Row, context: &ActionContext, change: fn(&str) -> String) -> Result<()> {
    let column = target_column(context)?;
    if let Some(value) = row.get(column.as_str()) {
        let changed = change(value);
        row.set(column, changed);
    }
    Ok(())
}

/// `uppercase`: upper-cases the target cell or column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl ActionDefinition for Uppercase {
    fn name(&self) -> &'static str {
        "uppercase"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Case
    }

    fn description(&self) -> &'static str {
        "Converts text to upper case"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        matches!(scope, Scope::Cell | Scope::Column)
    }

    fn accepts_column(&self, column: &Column) -> bool {
        is_text(column)
    }

    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        change_case(row, context, str::to_uppercase)
    }
}

/// `lowercase`: lower-cases the target cell or column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lowercase;

impl ActionDefinition for Lowercase {
    fn name(&self) -> &'static str {
        "lowercase"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Case
    }

    fn description(&self) -> &'static str {
        "Converts text to lower case"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        matches!(scope, Scope::Cell | Scope::Column)
    }

    fn accepts_column(&self, column: &Column) -> bool {
        is_text(column)
    }

    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        change_case(row, context, str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{row, run, schema};
    use prep_core::action::ActionStatus;
    use prep_core::row::{ColumnType, Schema};

    #[test]
    fn uppercase_column() {
        let schema = schema(&["first", "last"]);
        let mut rows = vec![row(&schema, 1, &["ada", "lovelace"]), row(&schema, 2, &["Alan", "turing"])];

        run(Uppercase, &[("scope", "column"), ("column_id", "0000")], &mut rows);

        assert_eq!(rows[0].get("0000"), Some("ADA"));
        assert_eq!(rows[1].get("0000"), Some("ALAN"));
        assert_eq!(rows[1].get("0001"), Some("turing"));
    }

    #[test]
    fn lowercase_single_cell() {
        let schema = schema(&["first"]);
        let mut rows = vec![row(&schema, 1, &["ADA"]), row(&schema, 2, &["ALAN"])];

        run(
            Lowercase,
            &[("scope", "cell"), ("column_id", "0000"), ("row_id", "2")],
            &mut rows,
        );

        assert_eq!(rows[0].get("0000"), Some("ADA"));
        assert_eq!(rows[1].get("0000"), Some("alan"));
    }

    #[test]
    fn numeric_column_is_refused() {
        let schema: Schema = [Column::new("0000", "age").with_type(ColumnType::Integer)]
            .into_iter()
            .collect();
        let mut rows = vec![row(&schema, 1, &["42"])];

        let (status, _) = run(Uppercase, &[("scope", "column"), ("column_id", "0000")], &mut rows);

        assert_eq!(status, ActionStatus::Canceled);
    }

    #[test]
    fn missing_cell_is_left_alone() {
        let schema = schema(&["first", "last"]);
        let mut rows = vec![row(&schema, 1, &["ada"])];
        run(Uppercase, &[("scope", "column"), ("column_id", "0001")], &mut rows);
        assert_eq!(rows[0].get("0001"), None);
    }
}
