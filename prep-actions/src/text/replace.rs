//! Pattern replacement.

use crate::support::{flag, is_text, target_column};
use prep_core::action::{ActionCategory, ActionContext, ActionDefinition, Scope};
use prep_core::error::{PrepError, Result};
use prep_core::row::{Column, Row};
use regex::Regex;

/// Pattern searched in each cell.
pub const CELL_VALUE: &str = "cell_value";
/// Replacement; `$1`-style group references are expanded.
pub const REPLACE_VALUE: &str = "replace_value";
/// When `true`, a match replaces the whole cell instead of the matched part.
pub const REPLACE_ENTIRE_CELL: &str = "replace_entire_cell";

struct Replacer {
    pattern: Regex,
    replacement: String,
    entire_cell: bool,
}

impl Replacer {
    fn replace(&self, value: &str) -> Option<String> {
        if self.entire_cell {
            let captures = self.pattern.captures(value)?;
            let mut out = String::new();
            captures.expand(&self.replacement, &mut out);
            return Some(out);
        }
        if !self.pattern.is_match(value) {
            return None;
        }
        Some(
            self.pattern
                .replace_all(value, self.replacement.as_str())
                .into_owned(),
        )
    }
}

/// `replace_on_value`: replaces text matching a regular expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceOnValue;

impl ActionDefinition for ReplaceOnValue {
    fn name(&self) -> &'static str {
        "replace_on_value"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Strings
    }

    fn description(&self) -> &'static str {
        "Replaces text matching a pattern"
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        matches!(scope, Scope::Cell | Scope::Column)
    }

    fn accepts_column(&self, column: &Column) -> bool {
        is_text(column)
    }

    fn compile(&self, context: &mut ActionContext) -> Result<()> {
        let source = context.require(CELL_VALUE)?;
        let pattern = Regex::new(source).map_err(|e| PrepError::InvalidActionParameter {
            action: self.name().to_string(),
            parameter: CELL_VALUE.to_string(),
            cause: e.to_string(),
        })?;
        let replacement = context.require(REPLACE_VALUE)?.to_string();
        let entire_cell = flag(context, REPLACE_ENTIRE_CELL);
        context.set_state(Replacer {
            pattern,
            replacement,
            entire_cell,
        });
        Ok(())
    }

    fn apply_on_column(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        let column = target_column(context)?;
        let Some(replacer) = context.state::<Replacer>() else {
            return Ok(());
        };
        if let Some(new) = row.get(column.as_str()).and_then(|v| replacer.replace(v)) {
            row.set(column, new);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{row, run, schema};
    use prep_core::action::{ActionFactory, Parameters};
    use std::sync::Arc;

    fn replace(value: &str, pattern: &str, replacement: &str, entire: bool) -> String {
        let schema = schema(&["text"]);
        let mut rows = vec![row(&schema, 1, &[value])];
        let entire = entire.to_string();
        run(
            ReplaceOnValue,
            &[
                ("scope", "column"),
                ("column_id", "0000"),
                (CELL_VALUE, pattern),
                (REPLACE_VALUE, replacement),
                (REPLACE_ENTIRE_CELL, entire.as_str()),
            ],
            &mut rows,
        );
        rows[0].get("0000").unwrap_or_default().to_string()
    }

    #[test]
    fn replaces_matched_part() {
        assert_eq!(replace("XXX_toto_YYY", "t.t.", "foobar", false), "XXX_foobar_YYY");
        assert_eq!(replace("XXX_123_YYY", r"_(\d{3,})_", "-$1-", false), "XXX-123-YYY");
    }

    #[test]
    fn replaces_entire_cell() {
        assert_eq!(replace("XXX_toto_YYY", "t.t.", "foobar", true), "foobar");
        assert_eq!(replace("XXX_123_YYY", r"_(\d{3,})_", "$1", true), "123");
    }

    #[test]
    fn no_match_keeps_value() {
        assert_eq!(replace("James Hetfield", "^Kirk", "H", true), "James Hetfield");
    }

    #[test]
    fn invalid_pattern_fails_compile() {
        let parameters = Parameters::new()
            .with("scope", "column")
            .with("column_id", "0000")
            .with(CELL_VALUE, "(")
            .with(REPLACE_VALUE, "x");
        let runtime = ActionFactory::create(Arc::new(ReplaceOnValue), &parameters).unwrap();
        let mut context = ActionContext::for_runtime(&runtime, 0);
        context.seed_schema(&schema(&["text"]));

        let err = runtime.compile(&mut context).unwrap_err();
        assert_eq!(err.code(), "E202");
    }
}
