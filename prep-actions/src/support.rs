//! Helpers shared by the built-in actions.

use prep_core::action::{ActionContext, keys};
use prep_core::error::Result;
use prep_core::row::{Column, ColumnId, ColumnType};

/// Id of the column a CELL or COLUMN action targets.
pub(crate) fn target_column(context: &ActionContext) -> Result<ColumnId> {
    context.require(keys::COLUMN_ID).map(ColumnId::from)
}

/// Whether a column holds free text.
pub(crate) fn is_text(column: &Column) -> bool {
    matches!(column.column_type, ColumnType::String | ColumnType::Any)
}

/// Parse an optional boolean parameter.
pub(crate) fn flag(context: &ActionContext, key: &str) -> bool {
    context
        .parameters()
        .get(key)
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}
